use crate::config::OutputFormat;
use crate::models::ProcessedEvent;
use prettytable::{cell, row, Table};
use std::io::{self, Write};

const BAR_WIDTH: u64 = 40;

pub fn print_events<W: Write>(
    format: OutputFormat,
    events: &[ProcessedEvent],
    out: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Table => print_pretty_table(events, out),
        OutputFormat::Lean => print_lean_table(events, out),
        OutputFormat::Json => print_json(events, out),
    }
}

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (count * BAR_WIDTH + max - 1) / max;
    "█".repeat(width as usize)
}

fn print_pretty_table<W: Write>(events: &[ProcessedEvent], out: &mut W) -> io::Result<()> {
    let max = events.iter().map(|e| e.count).max().unwrap_or(0);
    let mut table = Table::new();
    table.add_row(row!["TYPE", "COUNT", ""]);
    for event in events {
        table.add_row(row![
            &event.event_type,
            event.count.to_string(),
            bar(event.count, max)
        ]);
    }
    table.print(out)?;
    Ok(())
}

fn print_lean_table<W: Write>(events: &[ProcessedEvent], out: &mut W) -> io::Result<()> {
    let mut table = String::new();
    for event in events {
        table.push_str("TYPE: ");
        table.push_str(&event.event_type);
        table.push_str(" | TOTAL COUNT: ");
        table.push_str(event.count.to_string().as_str());
        table.push('\n');
    }
    out.write_all(table.as_bytes())
}

fn print_json<W: Write>(events: &[ProcessedEvent], out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, events)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ProcessedEvent> {
        vec![ProcessedEvent::new("Push", 4), ProcessedEvent::new("PR", 1)]
    }

    fn render(format: OutputFormat, events: &[ProcessedEvent]) -> String {
        let mut out = Vec::new();
        print_events(format, events, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn it_prints_one_lean_line_per_type() {
        assert_eq!(
            render(OutputFormat::Lean, &sample()),
            "TYPE: Push | TOTAL COUNT: 4\nTYPE: PR | TOTAL COUNT: 1\n"
        );
    }

    #[test]
    fn it_prints_json_the_chart_can_read() {
        let parsed: Vec<ProcessedEvent> =
            serde_json::from_str(&render(OutputFormat::Json, &sample())).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn it_scales_bars_to_the_largest_count() {
        assert_eq!(bar(4, 4).chars().count(), BAR_WIDTH as usize);
        assert_eq!(bar(1, 4).chars().count(), (BAR_WIDTH / 4) as usize);
        assert_eq!(bar(0, 0), "");
    }

    #[test]
    fn it_prints_a_pretty_table() {
        let table = render(OutputFormat::Table, &sample());
        assert!(table.contains("Push"));
        assert!(table.contains("PR"));
        assert!(table.contains("COUNT"));
    }
}
