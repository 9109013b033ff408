use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use eln_utils::buffer::{InsertAt, Region, StatusSink, TextBuffer, TextView};
use eln_utils::journal::{self, NoteFormat};
use eln_utils::scaffold::{self, ScaffoldKind};
use eln_utils::settings::{Settings, SETTINGS_NAME};
use eln_utils::{sequence_stats, snippets, transform_selections, Conversion, ModPattern, PairingMap};
use log::info;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eln")]
#[command(about = "Electronic lab notebook utilities: sequence transforms, snippets, journal notes, scaffolding")]
struct Args {
    #[arg(short = 's', long, global = true, help = "Settings file (default: ./eln_utils.sublime-settings)")]
    settings: Option<PathBuf>,

    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count, help = "Verbose output (-vv for debug)")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// The text being edited: a file, or stdin when no file is given.
#[derive(clap::Args)]
struct ViewArgs {
    #[arg(short = 'f', long, help = "File to edit (stdin if omitted)")]
    file: Option<PathBuf>,

    #[arg(long = "select", value_parser = parse_region, help = "Selection as BEGIN..END in chars; repeatable (default: whole text)")]
    selections: Vec<Region>,

    #[arg(short = 'i', long, default_value = "false", help = "Write the result back to --file instead of stdout")]
    in_place: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Project,
    Experiment,
}

#[derive(Subcommand)]
enum Command {
    /// Complement / reverse / convert the selected sequences
    Transform {
        #[command(flatten)]
        view: ViewArgs,

        #[arg(long, help = "Do not complement")]
        no_complement: bool,

        #[arg(short = 'r', long, help = "Reverse the sequence")]
        reverse: bool,

        #[arg(long, help = "Keep only A, T, C, G and U")]
        dna_only: bool,

        #[arg(short = 'a', long, help = "Append results at the end instead of replacing the selection")]
        append: bool,

        #[arg(short = 'm', long, help = "Pairing map: dna, rna, rna-to-dna, dna-to-rna; '+' keeps punctuation")]
        wc_map: Option<PairingMap>,

        #[arg(short = 'c', long, help = "Convert alphabet first: dna-to-rna or rna-to-dna")]
        convert: Option<Conversion>,

        #[arg(long, help = "Fail on characters the pairing map does not know")]
        strict: bool,

        #[arg(long, help = "Uppercase before complementing")]
        toupper: bool,

        #[arg(long, help = "Strip whitespace first")]
        remove_whitespace: bool,

        #[arg(long, help = "Strip dashes first")]
        remove_dashes: bool,

        #[arg(long, help = "Strip modification tags first")]
        remove_mods: bool,

        #[arg(short = 'p', long, help = "Keep 5'/3' marks and modification tags in place")]
        preserve: bool,

        #[arg(long, help = "Modification pattern: IDT or a regex")]
        mod_regex: Option<ModPattern>,
    },

    /// GC content of the selected sequences
    Stats {
        #[command(flatten)]
        view: ViewArgs,

        #[arg(long, help = "Keep only A, T, C, G and U before counting")]
        dna_only: bool,
    },

    /// Insert a snippet (journal_date_header, journal_daily_start, journal_timestamp or literal text)
    Snippet {
        snippet: String,

        #[command(flatten)]
        view: ViewArgs,

        #[arg(long, help = "Char offset to insert at (default: start of the first selection)")]
        at: Option<usize>,
    },

    /// Move notes from an external journal file into the notebook
    MergeJournal {
        #[arg(short = 'f', long, help = "Notebook file to insert into")]
        file: PathBuf,

        #[arg(short = 'n', long, help = "Notes file (default: best match among the journal dirs)")]
        notes: Option<PathBuf>,

        #[arg(long, help = "Char offset to insert at (default: end of file)")]
        at: Option<usize>,

        #[arg(short = 'k', long, help = "Keep the notes file content instead of moving it")]
        keep: bool,

        #[arg(long, help = "Do not turn paragraphs into bullets")]
        no_bullets: bool,

        #[arg(long, help = "Do not add a timestamp")]
        no_timestamp: bool,

        #[arg(long, help = "Do not add a journal date header")]
        no_header: bool,
    },

    /// Create a new project or experiment folder and page
    New {
        #[arg(value_enum)]
        kind: Kind,

        #[arg(long = "set", value_parser = parse_key_value, help = "Input as KEY=VALUE; missing inputs are prompted for")]
        inputs: Vec<(String, String)>,

        #[arg(long, help = "Do not write the page to disk")]
        no_save: bool,
    },
}

fn parse_region(s: &str) -> Result<Region, String> {
    let (a, b) = s
        .split_once("..")
        .ok_or_else(|| format!("expected BEGIN..END, got {s:?}"))?;
    let a = a.trim().parse().map_err(|e| format!("{a:?}: {e}"))?;
    let b = b.trim().parse().map_err(|e| format!("{b:?}: {e}"))?;
    Ok(Region::new(a, b))
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    Ok((k.trim().to_string(), v.to_string()))
}

/// Status messages go to stderr so stdout stays clean for text output.
struct CliStatus;

impl StatusSink for CliStatus {
    fn status_message(&mut self, msg: &str) {
        info!("{}", msg);
        eprintln!("ELN-Utils: {}", msg);
    }
}

fn open_view(args: &ViewArgs) -> Result<TextBuffer> {
    let text = match &args.file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("reading stdin")?;
            text
        }
    };
    let mut buffer = TextBuffer::from_string(text);
    let selections = if args.selections.is_empty() {
        vec![Region::new(0, buffer.size())]
    } else {
        args.selections.clone()
    };
    buffer.set_selections(selections);
    Ok(buffer)
}

fn write_view(args: &ViewArgs, buffer: TextBuffer) -> Result<()> {
    match (&args.file, args.in_place) {
        (Some(path), true) => {
            fs::write(path, buffer.as_str()).with_context(|| format!("writing {}", path.display()))?;
        }
        (None, true) => bail!("--in-place needs --file"),
        _ => {
            let mut out = io::stdout().lock();
            out.write_all(buffer.as_str().as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}

fn collect_inputs(chain: &mut scaffold::InputChain, given: &[(String, String)]) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while let Some((key, prompt)) = chain.next_prompt() {
        let value = match given.iter().find(|(k, _)| k == key) {
            Some((_, v)) => v.clone(),
            None => {
                eprint!("{} ", prompt);
                io::stderr().flush()?;
                lines.next().transpose()?.unwrap_or_default()
            }
        };
        chain.submit(&value);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings_path = args.settings.clone().unwrap_or_else(|| PathBuf::from(SETTINGS_NAME));
    let mut settings = Settings::load_or_default(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    let mut status = CliStatus;

    match args.command {
        Command::Transform {
            view,
            no_complement,
            reverse,
            dna_only,
            append,
            wc_map,
            convert,
            strict,
            toupper,
            remove_whitespace,
            remove_dashes,
            remove_mods,
            preserve,
            mod_regex,
        } => {
            let mut config = settings.sequence_transform.clone();
            config.complement &= !no_complement;
            config.reverse |= reverse;
            config.dna_only |= dna_only;
            config.replace &= !append;
            config.strict |= strict;
            config.toupper |= toupper;
            config.remove_whitespace |= remove_whitespace;
            config.remove_dashes |= remove_dashes;
            config.remove_mods |= remove_mods;
            config.preserve_marks_and_mods |= preserve;
            if let Some(map) = wc_map {
                config.wc_map = map;
            }
            if convert.is_some() {
                config.convert = convert;
            }
            if mod_regex.is_some() {
                config.mod_regex = mod_regex;
            }

            let mut buffer = open_view(&view)?;
            let edits = transform_selections(&mut buffer, &config, &mut status)?;
            info!("{} edit(s)", edits.len());
            write_view(&view, buffer)?;
        }

        Command::Stats { view, dna_only } => {
            let buffer = open_view(&view)?;
            for stats in sequence_stats(&buffer, dna_only, &mut status)? {
                println!("{}", stats);
            }
        }

        Command::Snippet { snippet, view, at } => {
            if view.file.is_none() && view.selections.is_empty() && at.is_none() {
                println!("{}", snippets::render(&snippet, Local::now())?);
                return Ok(());
            }
            let mut buffer = open_view(&view)?;
            let at = at.map(InsertAt::Offset).unwrap_or(InsertAt::Cursor);
            snippets::insert_snippet(&mut buffer, &snippet, at, Local::now())?;
            write_view(&view, buffer)?;
        }

        Command::MergeJournal {
            file,
            notes,
            at,
            keep,
            no_bullets,
            no_timestamp,
            no_header,
        } => {
            let notes = match notes {
                Some(notes) => notes,
                None => {
                    let dirs = journal::journal_dirs(&settings, Some(file.as_path()))?;
                    let files = journal::discover(&dirs, &settings.journal_notes_pattern, settings.min_file_size)?;
                    let index = journal::select_candidate(&files, Some(file.as_path()), &settings)?;
                    files[index].clone()
                }
            };
            let text = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let mut buffer = TextBuffer::from_string(text);
            let format = NoteFormat {
                paragraphs_to_bullet: !no_bullets,
                add_timestamp: !no_timestamp,
                add_journal_header: !no_header,
            };
            let at = at.map(InsertAt::Offset).unwrap_or(InsertAt::End);
            journal::merge_notes(&mut buffer, &notes, &format, at, Local::now(), &mut status)?;
            fs::write(&file, buffer.as_str()).with_context(|| format!("writing {}", file.display()))?;
            if !keep {
                journal::clear_notes(&notes)?;
            }

            settings.last_external_journal = Some(notes.display().to_string());
            if settings_path.is_file() {
                settings.save(&settings_path)?;
            }
        }

        Command::New { kind, inputs, no_save } => {
            let kind = match kind {
                Kind::Project => ScaffoldKind::Project,
                Kind::Experiment => ScaffoldKind::Experiment,
            };
            let scaffold_settings = settings.scaffold(kind);
            let mut chain = scaffold_settings.input_chain();
            collect_inputs(&mut chain, &inputs)?;
            let values = chain.into_values();

            let today = Local::now().date_naive();
            let Some(page) = scaffold::create(&scaffold_settings, &values, today, &mut status)? else {
                eprintln!("All inputs were empty, nothing created");
                return Ok(());
            };
            let save = settings.eln_experiments_save_to_file && !no_save;
            if save && page.save()? {
                println!("{}", page.filepath.display());
            } else {
                print!("{}", page.content);
            }
            info!("Created {} '{}'", kind, page.title);
        }
    }

    Ok(())
}
