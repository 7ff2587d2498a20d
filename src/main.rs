use anyhow::{Context, Result};
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

use species_atlas::{count_species, import_species, setup_database};

const DEFAULT_DB_PATH: &str = "species.db";
const DEFAULT_ANIMALS_PATH: &str = "data/sample_animals.csv";

struct Options {
    db_path: PathBuf,
    animals_path: PathBuf,
    session_id: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "import" {
        // Import mode: seed the catalogue from a CSV
        let csv_path = args
            .get(2)
            .context("Usage: species-atlas import <species.csv> [--db <path>]")?;
        let options = parse_options(&args[3..])?;
        run_import(Path::new(csv_path), &options.db_path)?;
    } else {
        // UI mode (default)
        let options = parse_options(&args[1..])?;
        run_ui_mode(&options)?;
    }

    Ok(())
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options {
        db_path: PathBuf::from(DEFAULT_DB_PATH),
        animals_path: PathBuf::from(DEFAULT_ANIMALS_PATH),
        session_id: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                let value = iter.next().context("--db requires a path")?;
                options.db_path = PathBuf::from(value);
            }
            "--animals" => {
                let value = iter.next().context("--animals requires a path")?;
                options.animals_path = PathBuf::from(value);
            }
            "--as" => {
                let value = iter.next().context("--as requires a user id")?;
                options.session_id = Some(value.clone());
            }
            other => {
                anyhow::bail!(
                    "Unknown argument: {} (expected --db, --animals or --as)",
                    other
                );
            }
        }
    }

    Ok(options)
}

fn run_import(csv_path: &Path, db_path: &Path) -> Result<()> {
    println!("🌿 Species Atlas - Catalogue Import");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n🔧 Setting up database...");
    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    println!("\n📂 Importing species from {}...", csv_path.display());
    import_species(&conn, csv_path)?;

    println!("\n🔍 Verifying database...");
    let count = count_species(&conn)?;
    println!("✓ Catalogue contains {} species", count);

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(options: &Options) -> Result<()> {
    use species_atlas::ui;
    use species_atlas::{list_species, load_ranked_animals};

    println!("🖥️  Loading Species Atlas...\n");

    let conn = Connection::open(&options.db_path)?;
    setup_database(&conn)?;

    println!("📚 Loading catalogue...");
    let species = list_species(&conn)?;
    if species.is_empty() {
        println!("   (catalogue is empty - seed it with: species-atlas import <species.csv>)");
    } else {
        println!("✓ Loaded {} species", species.len());
    }

    // A missing or malformed speeds file is not fatal: the chart page
    // simply renders nothing.
    let animals = match load_ranked_animals(&options.animals_path) {
        Ok(animals) => {
            println!("✓ Loaded {} ranked animals", animals.len());
            animals
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load animal speeds");
            Vec::new()
        }
    };

    println!("\nStarting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(species, animals, options.session_id.clone());
    ui::run_ui(&mut app, &conn)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_options: &Options) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
