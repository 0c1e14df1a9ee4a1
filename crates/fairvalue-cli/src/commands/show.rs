use fairvalue::{CombinedPoint, ParquetStore, Series};

use crate::cli::ShowArgs;
use crate::error::CliError;

pub(crate) fn run(args: &ShowArgs) -> Result<(), CliError> {
    let records = ParquetStore::read_file(&args.file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", render_table(&records));
    }
    Ok(())
}

fn render_table(records: &[CombinedPoint]) -> String {
    let mut out = format!("{:<8} {:<10} {:>12}  {}\n", "ticker", "date", "price", "series");
    for record in records {
        out.push_str(&format!(
            "{:<8} {:<10} {:>12.2}  {}\n",
            record.symbol.as_str(),
            record.date.to_string(),
            record.price,
            record.series
        ));
    }

    let fair_values = records
        .iter()
        .filter(|r| r.series == Series::FairValue)
        .count();
    out.push_str(&format!(
        "{} daily prices, {fair_values} fair values\n",
        records.len() - fair_values
    ));
    out
}
