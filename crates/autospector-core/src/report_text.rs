use crate::model::DamageReport;
use crate::overlay::confidence_percent;
use std::fmt::{self, Write as _};

/// Plain-text rendition of a report for export and the terminal.
pub fn render_text(report: &DamageReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, r: &DamageReport) -> fmt::Result {
    writeln!(out, "Vehicle Inspection Report")?;
    if let Some(short) = r.short_ref() {
        writeln!(out, "ID: #{short}")?;
    }
    if let Some(date) = r.date {
        writeln!(out, "Date: {}", date.format("%Y-%m-%d %H:%M UTC"))?;
    }
    if r.is_demo() {
        writeln!(out, "Mode: Demo (simulated results)")?;
    }
    writeln!(
        out,
        "Severity score: {}/100 ({})",
        r.score(),
        r.condition().as_str()
    )?;
    writeln!(out)?;

    writeln!(out, "Summary")?;
    writeln!(out, "  {}", r.summary)?;
    writeln!(out)?;

    if r.damages.is_empty() {
        writeln!(out, "Inspection Results: Passed")?;
        writeln!(out, "  No visible damage detected.")?;
    } else {
        writeln!(out, "Inspection Results: {} Issues Found", r.damages.len())?;
        for (i, d) in r.damages.iter().enumerate() {
            writeln!(
                out,
                "  {}. {} [{}] confidence {}",
                i + 1,
                d.label,
                d.severity,
                confidence_percent(d.confidence, 1)
            )?;
            if !d.description.is_empty() {
                writeln!(out, "     {}", d.description)?;
            }
        }
    }
    writeln!(out)?;

    writeln!(out, "Parts Inspected")?;
    if r.vehicle_parts_visible.is_empty() {
        writeln!(out, "  (none listed)")?;
    } else {
        writeln!(out, "  {}", r.vehicle_parts_visible.join(", "))?;
    }
    Ok(())
}
