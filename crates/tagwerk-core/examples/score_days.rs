use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tagwerk_core::{assemble_transitions, DayRecord, RewardSettings};

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1);
    let reader: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(File::open(p)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: DayRecord = serde_json::from_str(&line)?;
        records.push(record);
    }

    let transitions = assemble_transitions(&records, &[], &RewardSettings::default());
    for t in &transitions {
        let actions: Vec<&str> = t.actions.iter().map(|a| a.as_str()).collect();
        println!("{}\t{:.3}\t{}", t.date, t.reward, actions.join(","));
    }

    Ok(())
}
