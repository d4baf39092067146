mod store;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use solfa_audio::{degree_prompt, Accompaniment, AudioBackend, NullBackend, PlaybackPlan};
use solfa_domain::catalog::{self, CHORDS, INTERVALS, SCALE_DEGREES};
use solfa_domain::{DomainError, Exercise, Note, PitchClass};
use solfa_tutor::{
    accuracy_report, format_percentage, IntervalFeedback, SlotResult, TimingReport, TrainerSession,
};

use crate::store::SettingsStore;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Ear training for intervals, scale degrees and progressions",
    long_about = None
)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Seed for reproducible questions
    #[arg(long)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Name the note an interval away from a start note
    Intervals,
    /// Name the scale degree heard over a tonic
    Degrees,
    /// Transcribe a twelve-note melody and its four-chord progression
    Melody {
        #[arg(long, value_enum, default_value_t = AccompanimentArg::Arpeggio)]
        accompaniment: AccompanimentArg,
        /// Key with octave, e.g. `F#4`
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        bpm: Option<u32>,
    },
    /// Print response times and accuracy
    Stats,
    /// Restore default settings and clear statistics
    Reset,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AccompanimentArg {
    Arpeggio,
    Harmonic,
    Drone,
}

impl From<AccompanimentArg> for Accompaniment {
    fn from(value: AccompanimentArg) -> Self {
        match value {
            AccompanimentArg::Arpeggio => Accompaniment::Arpeggio,
            AccompanimentArg::Harmonic => Accompaniment::Harmonic,
            AccompanimentArg::Drone => Accompaniment::TonicDrone,
        }
    }
}

struct App {
    session: TrainerSession,
    store: SettingsStore,
    rng: Pcg32,
    backend: NullBackend,
}

impl App {
    fn persist(&self) {
        if let Err(err) = self.store.save(&self.session.settings()) {
            error!(?err, "failed to save settings");
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = match cli.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::default_location().ok_or_else(|| anyhow!("no config dir"))?,
    };
    if let Command::Reset = cli.command {
        store.reset()?;
        println!("Settings reset at {}", store.path().display());
        return Ok(());
    }

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed, "seeding question generator");
    let mut rng = Pcg32::seed_from_u64(seed);
    let session = TrainerSession::from_settings(store.load(), &mut rng)?;
    let mut app = App {
        session,
        store,
        rng,
        backend: NullBackend,
    };

    match cli.command {
        Command::Intervals => run_intervals(&mut app),
        Command::Degrees => run_degrees(&mut app),
        Command::Melody {
            accompaniment,
            key,
            bpm,
        } => {
            if let Some(key) = key {
                app.session.set_selected_key(key.parse::<Note>()?);
            }
            if let Some(bpm) = bpm {
                app.session.set_bpm(bpm);
            }
            run_melody(&mut app, accompaniment.into())
        }
        Command::Stats => {
            print_stats(&app.session);
            Ok(())
        }
        Command::Reset => Ok(()),
    }
}

fn read_command(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}> ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim().to_string();
    Ok((line != "q" && line != "quit").then_some(line))
}

/// One line typed during the interval drill.
#[derive(Debug, PartialEq, Eq)]
enum IntervalCommand {
    Next,
    Toggle(usize),
    Answer(PitchClass),
}

fn parse_interval_command(line: &str) -> Result<IntervalCommand, DomainError> {
    if line == "next" {
        return Ok(IntervalCommand::Next);
    }
    if let Some(name) = line.strip_prefix("toggle ") {
        return catalog::interval_by_name(name.trim()).map(IntervalCommand::Toggle);
    }
    PitchClass::from_name(line).map(IntervalCommand::Answer)
}

/// One line typed during the scale-degree drill. An empty line replays.
#[derive(Debug, PartialEq, Eq)]
enum DegreeCommand {
    Play,
    Toggle(usize),
    Answer(&'static str),
}

fn parse_degree_command(line: &str) -> Result<DegreeCommand, DomainError> {
    if line.is_empty() || line == "play" {
        return Ok(DegreeCommand::Play);
    }
    if let Some(label) = line.strip_prefix("toggle ") {
        return catalog::degree_by_label(label.trim()).map(DegreeCommand::Toggle);
    }
    let index = catalog::degree_by_label(line)?;
    Ok(DegreeCommand::Answer(SCALE_DEGREES[index].label))
}

fn run_intervals(app: &mut App) -> Result<()> {
    app.session.set_exercise(Exercise::Intervals);
    app.persist();
    println!("Answer with a note name (C, C#, Db ...).");
    println!("`next`, `toggle <interval>`, `q` to quit.");
    let mut started = Instant::now();
    loop {
        if app.session.intervals().feedback() != IntervalFeedback::AwaitingAnswer {
            app.session.intervals_mut().next(&mut app.rng)?;
            started = Instant::now();
        }
        if let Some(question) = app.session.intervals().question() {
            println!("{}", question.prompt());
        }
        let Some(line) = read_command("interval")? else {
            break;
        };
        let command = match parse_interval_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match command {
            IntervalCommand::Next => {
                app.session.intervals_mut().next(&mut app.rng)?;
                started = Instant::now();
            }
            IntervalCommand::Toggle(index) => {
                if app.session.intervals_mut().toggle(index, &mut app.rng)? {
                    started = Instant::now();
                    app.persist();
                } else {
                    println!("At least one interval must stay enabled.");
                }
            }
            IntervalCommand::Answer(chosen) => {
                let elapsed = started.elapsed().as_secs_f64();
                match app.session.intervals_mut().submit_answer(chosen, elapsed) {
                    Some(outcome) if outcome.correct => {
                        println!("Correct! ({elapsed:.2}s)");
                        app.persist();
                        std::thread::sleep(Duration::from_secs(1));
                    }
                    Some(outcome) => println!(
                        "Incorrect. The correct answer was {}. Type `next` to continue.",
                        outcome.correct_answer
                    ),
                    None => {}
                }
            }
        }
    }
    Ok(())
}

fn run_degrees(app: &mut App) -> Result<()> {
    app.session.set_exercise(Exercise::ScaleDegrees);
    app.persist();
    println!("Press enter to hear a tonic and a degree; enter again replays it.");
    println!("Answer with a degree label (1, b2, 2 ...). `toggle <label>`, `q` to quit.");
    loop {
        let Some(line) = read_command("degree")? else {
            break;
        };
        let command = match parse_degree_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match command {
            DegreeCommand::Play => {
                let question = app.session.degrees_mut().play(&mut app.rng)?;
                for note in degree_prompt(question.tonic(), question.target()) {
                    app.backend.play(&note)?;
                }
                println!("Playing tonic {}.", question.tonic());
            }
            DegreeCommand::Toggle(index) => {
                if app.session.degrees_mut().toggle(index)? {
                    app.persist();
                } else {
                    println!("At least one degree must stay enabled.");
                }
            }
            DegreeCommand::Answer(label) => {
                match app.session.degrees_mut().submit_answer(label) {
                    Some(outcome) if outcome.correct => println!("Correct!"),
                    Some(outcome) => println!("Incorrect. The answer was {}.", outcome.answer),
                    None => println!("Press enter to hear a question first."),
                }
                app.persist();
            }
        }
    }
    Ok(())
}

fn run_melody(app: &mut App, accompaniment: Accompaniment) -> Result<()> {
    app.session.set_exercise(Exercise::Melody);
    app.persist();
    println!("Commands: play, next, guess <slot> <degree>, chord <slot> <name>, check, hide,");
    println!("          toggle-degree <label>, toggle-chord <name>, q");
    loop {
        let Some(line) = read_command("melody")? else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let result = match words.as_slice() {
            ["play"] => {
                let exercise = app.session.melody();
                let plan = PlaybackPlan::new(
                    app.session.selected_key(),
                    app.session.bpm(),
                    exercise.melody().clone(),
                    *exercise.progression(),
                    accompaniment,
                )?;
                plan.render(&mut app.backend, plan.cycle_beats())?;
                app.backend.release_all()?;
                println!("Played in {} at {} bpm.", app.session.selected_key(), app.session.bpm());
                Ok(())
            }
            ["next"] => {
                let result = app.session.melody_mut().new_round(&mut app.rng);
                app.persist();
                result
            }
            ["guess", slot, label] => parse_slot(slot)
                .and_then(|slot| app.session.melody_mut().guess_degree(slot, label)),
            ["chord", slot, name] => parse_slot(slot).and_then(|slot| {
                let chord = catalog::chord_by_name(name)?;
                app.session.melody_mut().guess_chord(slot, chord)
            }),
            ["check"] => {
                let report = app.session.melody_mut().check_answers();
                print_slots("melody", &report.melody, &app.session.melody().melody().labels());
                print_slots("chords", &report.chords, &app.session.melody().progression().names());
                Ok(())
            }
            ["hide"] => {
                app.session.melody_mut().hide_answers();
                Ok(())
            }
            ["toggle-degree", label] => catalog::degree_by_label(label).and_then(|index| {
                let changed = app.session.melody_mut().toggle_degree(index)?;
                app.persist();
                report_toggle(changed);
                Ok(())
            }),
            ["toggle-chord", name] => catalog::chord_by_name(name).and_then(|index| {
                let changed = app.session.melody_mut().toggle_chord(index)?;
                app.persist();
                report_toggle(changed);
                Ok(())
            }),
            _ => {
                println!("Unknown command.");
                Ok(())
            }
        };
        if let Err(err) = result {
            println!("{err}");
        }
    }
    Ok(())
}

/// Slots are numbered from 1 on screen.
fn parse_slot(text: &str) -> Result<usize, DomainError> {
    text.parse::<usize>()
        .ok()
        .and_then(|slot| slot.checked_sub(1))
        .ok_or_else(|| DomainError::validation(format!("bad slot {text}")))
}

fn report_toggle(changed: bool) {
    if !changed {
        println!("At least one entry must stay enabled.");
    }
}

fn print_slots(title: &str, results: &[SlotResult], answers: &[&str]) {
    let cells: Vec<String> = results
        .iter()
        .zip(answers)
        .map(|(result, answer)| match result {
            SlotResult::Correct => format!("{answer}✓"),
            SlotResult::Incorrect => format!("{answer}✗"),
            SlotResult::Unanswered => format!("{answer}?"),
        })
        .collect();
    println!("{title}: {}", cells.join(" "));
}

fn print_stats(session: &TrainerSession) {
    println!("Interval response times (last 5 correct answers):");
    let report = TimingReport::from_matrix(session.intervals().timings());
    let mut any = false;
    for row in &report.rows {
        for cell in &row.cells {
            if let Some(summary) = cell.summary {
                any = true;
                println!(
                    "  {:<3} {:<12}{} {:>6.2}s {:?}",
                    row.note.name(),
                    cell.interval,
                    cell.direction.arrow(),
                    summary.average,
                    summary.tier
                );
            }
        }
    }
    if !any {
        println!("  no data yet");
    }
    println!("Scale degree accuracy:");
    for degree in accuracy_report(session.degrees().accuracy()) {
        println!(
            "  {:<3} {:>5} ({}/{})",
            degree.label,
            format_percentage(degree.percentage),
            degree.tally.correct,
            degree.tally.total
        );
    }
    println!(
        "Enabled: {}/{} intervals, {}/{} degrees, {}/{} chords",
        session.intervals().enabled().enabled_count(),
        INTERVALS.len(),
        session.degrees().enabled().enabled_count(),
        SCALE_DEGREES.len(),
        session.melody().enabled_chords().enabled_count(),
        CHORDS.len()
    );
}
