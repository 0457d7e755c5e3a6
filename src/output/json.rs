use crate::model::UpdateReport;
use anyhow::Result;

pub fn print_json(report: &UpdateReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}
