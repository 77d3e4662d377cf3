use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use sweeper_core::*;
use sweeper_store::*;
use tokio::sync::mpsc;

pub use difficulty::*;
pub use input::*;
pub use render::*;
pub use report::*;
pub use session::*;

mod difficulty;
mod input;
mod render;
mod report;
mod session;

#[derive(Parser, Debug)]
#[command(name = "sweeper", version, about, long_about = None)]
pub struct Cli {
    /// What log level to use
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Where preferences and the result history are kept
    #[arg(long, global = true, env = "SWEEPER_DATA_DIR", default_value = ".sweeper")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one game in the terminal
    Play {
        #[command(flatten)]
        overrides: SettingsArgs,

        /// Force a seed instead of random
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// List finished games, most recent first
    History {
        /// Show the full detail of the entry at this position (1 is the most recent)
        #[arg(long)]
        detail: Option<usize>,
    },
    /// Show or change the saved preferences
    Settings {
        #[command(flatten)]
        changes: SettingsArgs,
    },
    /// Print the results message for a finished game
    Report {
        /// Position in the history, 1 is the most recent
        #[arg(default_value_t = 1)]
        index: usize,

        /// Address the message is meant for
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Easy, Normal or Hard
    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,

    /// Time limit in minutes, at least 1
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub minutes: Option<u32>,

    /// Name recorded with each result
    #[arg(short, long)]
    pub alias: Option<String>,
}

impl SettingsArgs {
    fn apply_to(&self, prefs: &mut Preferences) {
        if let Some(difficulty) = self.difficulty {
            prefs.difficulty = difficulty;
        }
        if let Some(minutes) = self.minutes {
            prefs.time_limit_minutes = minutes;
        }
        if let Some(alias) = &self.alias {
            prefs.alias = alias.clone();
        }
    }
}

struct DataDir(PathBuf);

impl DataDir {
    fn preferences(&self) -> TomlPreferencesStore {
        TomlPreferencesStore::new(self.0.join("preferences.toml"))
    }

    fn results(&self) -> JsonLinesStore {
        JsonLinesStore::new(self.0.join("results.jsonl"))
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let data = DataDir(cli.data_dir);
    match cli.command {
        Command::Play { overrides, seed } => play(&data, &overrides, seed).await,
        Command::History { detail } => history(&data, detail),
        Command::Settings { changes } => settings(&data, &changes),
        Command::Report { index, to } => report(&data, index, to),
    }
}

async fn play(data: &DataDir, overrides: &SettingsArgs, seed: Option<u64>) -> Result<()> {
    let mut prefs = data
        .preferences()
        .load()
        .context("Could not read preferences")?;
    overrides.apply_to(&mut prefs);
    let settings = GameSettings::from(&prefs);

    let seed = seed.unwrap_or_else(rand::random);
    log::debug!("seed: {}", seed);
    let mut generator = RandomBoardGenerator::new(seed);
    let engine = GameEngine::new_game(&mut generator, settings.config, settings.max_time_secs);
    let session = GameSession::start(engine, settings.alias.clone());

    println!(
        "{} game, {} mines, {} seconds. {}",
        settings.difficulty, settings.config.mines, settings.max_time_secs, HELP
    );
    println!("{}", render_board(&session.board(), false));

    drive(&session, spawn_stdin_reader()).await?;
    session.stop_timer();

    let Some(result) = session.result() else {
        println!("Game abandoned.");
        return Ok(());
    };

    if matches!(result.outcome, Outcome::Lost) {
        println!("{}", render_board(&session.board(), true));
    }
    for line in summary_lines(&result) {
        println!("{}", line);
    }

    // a failed save is reported but the game itself is already over
    if let Err(err) = data.results().append(&result) {
        log::error!("Could not save game result: {}", err);
        eprintln!("Could not save game result: {}", err);
    }
    Ok(())
}

/// Lines typed by the player, read on a detached thread that never holds up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Applies player commands until the game ends, the player quits or input runs out.
async fn drive(
    session: &GameSession,
    mut input: mpsc::Receiver<std::io::Result<String>>,
) -> Result<()> {
    let side = session.side();
    let mut state_rx = session.subscribe();

    while !session.snapshot().state.is_finished() {
        tokio::select! {
            line = input.recv() => {
                let Some(line) = line else {
                    break;
                };
                let line = line.context("Could not read input")?;
                match parse_command(&line, side) {
                    Ok(PlayerCommand::Reveal(coords)) => {
                        let outcome = session.reveal(coords);
                        if outcome == RevealOutcome::AlreadyRevealed {
                            println!(
                                "Cell ({}, {}) is already revealed!",
                                u16::from(coords.0) + 1,
                                u16::from(coords.1) + 1
                            );
                        }
                        if !outcome.has_update() {
                            continue;
                        }
                    }
                    Ok(PlayerCommand::Flag(coords)) => {
                        if !session.toggle_flag(coords).has_update() {
                            continue;
                        }
                    }
                    Ok(PlayerCommand::Moves) => {
                        for m in session.moves() {
                            println!(
                                "({}, {}) at {} s",
                                u16::from(m.coords.0) + 1,
                                u16::from(m.coords.1) + 1,
                                m.elapsed_secs
                            );
                        }
                        continue;
                    }
                    Ok(PlayerCommand::Help) => {
                        println!("{}", HELP);
                        continue;
                    }
                    Ok(PlayerCommand::Quit) => break,
                    Err(err) => {
                        println!("{}", err);
                        continue;
                    }
                }
                let snapshot = session.snapshot();
                println!("{}", render_board(&session.board(), snapshot.state.is_finished()));
                println!(
                    "Time: {} s  Mines: {}  Unrevealed: {}",
                    snapshot.elapsed_secs, snapshot.mines_left, snapshot.unrevealed_cells
                );
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn history(data: &DataDir, detail_index: Option<usize>) -> Result<()> {
    let results = data
        .results()
        .list_all()
        .context("Could not read result history")?;

    if let Some(index) = detail_index {
        let result = nth_result(&results, index)?;
        println!("{}", detail(result));
        return Ok(());
    }

    if results.is_empty() {
        println!("No games played yet.");
    }
    for (i, result) in results.iter().enumerate() {
        println!(
            "{:>3}. {}  {:<6} {:>4}s  {}",
            i + 1,
            result.timestamp.format("%d/%m/%Y %H:%M"),
            result.outcome,
            result.duration_secs,
            result.alias
        );
    }
    Ok(())
}

fn settings(data: &DataDir, changes: &SettingsArgs) -> Result<()> {
    let store = data.preferences();
    if let Some(difficulty) = changes.difficulty {
        store.set_difficulty(difficulty)?;
    }
    if let Some(minutes) = changes.minutes {
        store.set_time_limit_minutes(minutes)?;
    }
    if let Some(alias) = &changes.alias {
        store.set_alias(alias)?;
    }

    let prefs = store.load().context("Could not read preferences")?;
    println!("Difficulty: {}", prefs.difficulty);
    println!("Time limit: {} min", prefs.time_limit_minutes);
    println!("Alias: {}", prefs.alias);
    Ok(())
}

fn report(data: &DataDir, index: usize, to: Option<String>) -> Result<()> {
    let results = data
        .results()
        .list_all()
        .context("Could not read result history")?;
    let report = Report::new(nth_result(&results, index)?, to);

    if let Some(recipient) = &report.recipient {
        println!("To: {}", recipient);
    }
    println!("Subject: {}\n\n{}", report.subject, report.body);
    Ok(())
}

fn nth_result(results: &[GameResult], index: usize) -> Result<&GameResult> {
    index
        .checked_sub(1)
        .and_then(|i| results.get(i))
        .with_context(|| format!("No game at position {} ({} stored)", index, results.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_play_overrides() {
        let cli = Cli::try_parse_from([
            "sweeper", "play", "--difficulty", "hard", "--minutes", "5", "--seed", "9",
        ])
        .unwrap();

        let Command::Play { overrides, seed } = cli.command else {
            panic!("expected play");
        };
        assert_eq!(seed, Some(9));

        let mut prefs = Preferences::default();
        overrides.apply_to(&mut prefs);
        let settings = GameSettings::from(&prefs);
        assert_eq!(settings.config, GameConfig::new_unchecked(8, 12));
        assert_eq!(settings.max_time_secs, 300);
    }

    #[test]
    fn zero_minutes_is_rejected() {
        assert!(Cli::try_parse_from(["sweeper", "play", "--minutes", "0"]).is_err());
        assert!(Cli::try_parse_from(["sweeper", "settings", "-m", "0"]).is_err());
        assert!(Cli::try_parse_from(["sweeper", "settings", "-m", "1"]).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn time_limit_ends_the_game_while_input_is_pending() {
        let board = Board::from_mine_coords(3, &[(0, 0)]).unwrap();
        let session = GameSession::start(GameEngine::from_board(board, 2), "ana");
        let (_tx, rx) = mpsc::channel(1);

        drive(&session, rx).await.unwrap();

        assert_eq!(
            session.snapshot().state,
            GameState::Lost(LossReason::TimeLimit(2))
        );
        assert_eq!(session.result().unwrap().outcome, Outcome::Lost);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_are_applied_until_input_closes() {
        let board = Board::from_mine_coords(3, &[(2, 2)]).unwrap();
        let session = GameSession::start(GameEngine::from_board(board, 60), "ana");
        let (tx, rx) = mpsc::channel(4);
        tx.send(Ok("f 3 3".to_string())).await.unwrap();
        tx.send(Ok("bogus".to_string())).await.unwrap();
        drop(tx);

        drive(&session, rx).await.unwrap();

        assert_eq!(session.snapshot().state, GameState::Won);
        assert_eq!(session.moves().len(), 1);
    }

    #[test]
    fn history_positions_start_at_one() {
        assert!(nth_result(&[], 1).is_err());
        assert!(nth_result(&[], 0).is_err());
    }

    #[test]
    fn settings_command_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir(dir.path().to_path_buf());
        let changes = SettingsArgs {
            alias: Some("ana".to_string()),
            ..Default::default()
        };

        settings(&data, &changes).unwrap();

        assert_eq!(data.preferences().alias().unwrap(), "ana");
        assert_eq!(data.preferences().difficulty().unwrap(), Difficulty::Normal);
    }
}
