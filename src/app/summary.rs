use std::time::Duration;

use rowburst::dispatch::RunReport;

pub(crate) fn summary_lines(report: &RunReport, elapsed: Duration) -> Vec<String> {
    let elapsed_ms = elapsed.as_millis().max(1);
    let rps_x100 = u128::from(report.dispatched)
        .saturating_mul(100_000)
        .checked_div(elapsed_ms)
        .unwrap_or(0);
    let rps_x100 = u64::try_from(rps_x100).unwrap_or(u64::MAX);

    let status = if report.cancelled {
        "cancelled"
    } else {
        "completed"
    };
    vec![
        format!("Run {}", status),
        format!("Rows: {}/{}", report.final_snapshot().processed, report.total),
        format!("Dispatched: {}", report.dispatched),
        format!("Succeeded: {}", report.succeeded),
        format!(
            "Errors: {} (client: {}, exhausted: {}, aborted: {}, mapping: {}, worker: {})",
            report.errors(),
            report.client_failed,
            report.exhausted,
            report.aborted,
            report.mapping_failed,
            report.worker_faults
        ),
        format!(
            "Elapsed: {}.{:03}s",
            elapsed.as_secs(),
            elapsed.subsec_millis()
        ),
        format!(
            "Avg rate: {}.{:02} req/s",
            rps_x100.checked_div(100).unwrap_or(0),
            rps_x100.checked_rem(100).unwrap_or(0)
        ),
    ]
}

pub(crate) fn print_summary(report: &RunReport, elapsed: Duration) {
    for line in summary_lines(report, elapsed) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_outcomes() -> Result<(), String> {
        let report = RunReport {
            total: 10,
            processed: 10,
            dispatched: 9,
            succeeded: 7,
            client_failed: 1,
            exhausted: 1,
            mapping_failed: 1,
            ..RunReport::default()
        };
        let lines = summary_lines(&report, Duration::from_secs(3));
        let expected = [
            "Run completed",
            "Rows: 10/10",
            "Dispatched: 9",
            "Succeeded: 7",
            "Errors: 3 (client: 1, exhausted: 1, aborted: 0, mapping: 1, worker: 0)",
            "Elapsed: 3.000s",
            "Avg rate: 3.00 req/s",
        ];
        if lines != expected {
            return Err(format!("unexpected summary: {:?}", lines));
        }
        Ok(())
    }

    #[test]
    fn cancelled_summary_keeps_partial_rows() -> Result<(), String> {
        let report = RunReport {
            total: 10,
            processed: 4,
            cancelled: true,
            ..RunReport::default()
        };
        let lines = summary_lines(&report, Duration::ZERO);
        match (lines.first(), lines.get(1)) {
            (Some(first), Some(rows)) if first == "Run cancelled" && rows == "Rows: 4/10" => {
                Ok(())
            }
            _ => Err(format!("unexpected summary: {:?}", lines)),
        }
    }
}
