//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `qna_core` linkage and database bootstrap from a shell.
//! - Print sequence positions and row counts in a stable `key=value` form.

use qna_core::db::open_db;
use qna_core::{
    init_logging, CoreConfig, EntityKind, IdentifierSequencer, SqliteAnswerStore,
    SqliteQuestionStore, SqliteSequencer, SqliteUserStore,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("qna_core ping={}", qna_core::ping());
    println!("qna_core version={}", qna_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("qna_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let conn = open_db(&config.db_path)?;
    println!("db path={}", config.db_path.display());

    let sequencer = SqliteSequencer::try_new(&conn)?;
    let counts = [
        SqliteUserStore::try_new(&conn)?.count()?,
        SqliteQuestionStore::try_new(&conn)?.count()?,
        SqliteAnswerStore::try_new(&conn)?.count()?,
    ];

    for (kind, rows) in EntityKind::ALL.into_iter().zip(counts) {
        let sequence = kind.sequence_name();
        println!(
            "{kind} rows={rows} {sequence}={}",
            sequencer.current_value(sequence)?
        );
    }

    log::info!("event=cli_probe module=cli status=ok");
    Ok(())
}
