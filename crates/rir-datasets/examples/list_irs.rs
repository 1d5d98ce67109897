//! List a dataset's catalog, then stream every IR once.
//!
//! ```sh
//! cargo run --example list_irs -- openair /data/openair
//! cargo run --example list_irs -- openair /data/openair --json
//! ```

use std::path::Path;

use rir_datasets::DatasetRegistry;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let registry = DatasetRegistry::with_builtin();
    let (id, root) = match (args.first(), args.get(1)) {
        (Some(id), Some(root)) => (id.clone(), root.clone()),
        _ => {
            eprintln!("usage: list_irs <dataset-id> <root> [--json]");
            eprintln!("known ids: {}", registry.ids().join(", "));
            std::process::exit(2);
        }
    };
    let as_json = args.iter().any(|a| a == "--json");

    if let Err(e) = run(&registry, &id, Path::new(&root), as_json) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(
    registry: &DatasetRegistry,
    id: &str,
    root: &Path,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = registry.build(id, root)?;
    let catalog = dataset.list_irs()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    for entry in &catalog {
        println!(
            "{}\t{} ch\t{} samples\t{} Hz",
            entry.id, entry.channels, entry.samples, entry.sample_rate
        );
    }

    let mut total_seconds = 0.0;
    let mut unreadable = 0usize;
    for record in dataset.get_all()? {
        match record {
            Ok((_, sample_rate, matrix)) => total_seconds += matrix.duration(sample_rate),
            Err(e) => {
                eprintln!("warning: {e}");
                unreadable += 1;
            }
        }
    }
    println!(
        "{}: {} IRs, {:.1} s of audio, {} unreadable",
        dataset.name(),
        catalog.len(),
        total_seconds,
        unreadable
    );
    Ok(())
}
