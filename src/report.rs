use crate::sampler::SampleResult;

/// Render one `<endpoint> <mean> <error|nil>` line per result, in the order given.
pub fn format_report(results: &[SampleResult]) -> String {
    let mut out = String::new();
    for r in results {
        // Duration's Debug output is the human unit form: 12ms, 5s, 1.25ms
        match &r.error {
            Some(e) => out.push_str(&format!("{} {:?} {}\n", r.endpoint, r.mean, e)),
            None => out.push_str(&format!("{} {:?} nil\n", r.endpoint, r.mean)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use std::time::Duration;

    fn results() -> Vec<SampleResult> {
        vec![
            SampleResult {
                endpoint: "a.example".into(),
                mean: Duration::from_millis(12),
                error: None,
                failed_attempts: 0,
            },
            SampleResult {
                endpoint: "b.example".into(),
                mean: Duration::from_millis(5000),
                error: Some(ProbeError::connect("10.0.0.2:4000".parse().unwrap(), "i/o timeout")),
                failed_attempts: 10,
            },
        ]
    }

    #[test]
    fn one_line_per_result() {
        let report = format_report(&results());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a.example 12ms nil");
        assert!(lines[1].starts_with("b.example 5s "));
        assert!(lines[1].ends_with("dial tcp 10.0.0.2:4000: i/o timeout"));
        assert!(report.ends_with('\n'));
    }

    #[test]
    fn fractional_units_are_kept() {
        let r = SampleResult {
            endpoint: "c.example".into(),
            mean: Duration::from_micros(12_300),
            error: None,
            failed_attempts: 0,
        };
        assert_eq!(format_report(&[r]), "c.example 12.3ms nil\n");
    }

    #[test]
    fn formatting_is_stable() {
        let results = results();
        assert_eq!(format_report(&results), format_report(&results));
    }

    #[test]
    fn empty_collection_gives_empty_report() {
        assert_eq!(format_report(&[]), "");
    }
}
