use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use i18n_kit::calendar::{CalendarLocale, DateFormatter, JalaliDate, JalaliDateTime};
use i18n_kit::config::Config;
use i18n_kit::gettext::{Endianness, MessageCatalog, MoFile, PoFile};
use i18n_kit::i18n::{Args, Locale, MessageFormatter, PlaceholderValidator, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// Gettext catalog tooling, ICU-style message formatting and Jalali dates
#[derive(Parser, Debug)]
#[command(name = "i18n-kit", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a PO file into a binary MO catalog
    Compile {
        input: PathBuf,
        output: PathBuf,
        /// Write big-endian integers (overrides $I18N_BIG_ENDIAN)
        #[arg(long)]
        big_endian: bool,
    },

    /// Convert a binary MO catalog back into a PO file
    Decompile {
        input: PathBuf,
        output: PathBuf,
        /// Language written to a generated PO header (defaults to $I18N_LANGUAGE)
        #[arg(long)]
        language: Option<Locale>,
    },

    /// Print the messages of one context as JSON
    Dump {
        /// MO or PO file
        file: PathBuf,
        /// Context (message category); empty selects entries without context
        #[arg(long, default_value = "")]
        context: String,
    },

    /// Check that translations keep the placeholders of their source messages
    Check {
        /// MO or PO file
        file: PathBuf,
    },

    /// Format a message pattern with the ICU fallback formatter
    Format {
        pattern: String,
        /// Argument as name=value (repeatable)
        #[arg(short, long = "arg", value_parser = parse_arg)]
        args: Vec<(String, Value)>,
    },

    /// Translate a message through the configured catalogs
    Translate {
        category: String,
        message: String,
        /// Target language (defaults to $I18N_LANGUAGE)
        #[arg(long)]
        language: Option<Locale>,
        /// Argument as name=value (repeatable)
        #[arg(short, long = "arg", value_parser = parse_arg)]
        args: Vec<(String, Value)>,
    },

    /// Convert a Gregorian date (YYYY-MM-DD) to the Jalali calendar
    ToJalali {
        date: NaiveDate,
        /// strftime-style output pattern
        #[arg(long, default_value = "%Y-%m-%d")]
        format: String,
        /// Use Persian month and weekday names
        #[arg(long)]
        persian: bool,
        /// Render digits with Persian numerals (with --persian)
        #[arg(long)]
        persian_digits: bool,
    },

    /// Convert a Jalali date (YYYY-MM-DD or YYYY/MM/DD) to the Gregorian calendar
    ToGregorian { date: JalaliDate },
}

fn parse_arg(raw: &str) -> std::result::Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("argument name is empty in '{raw}'"));
    }
    Ok((name.trim().to_string(), Value::parse(value)))
}

fn load_catalog(path: &Path) -> Result<MessageCatalog> {
    let catalog = if is_po(path) {
        PoFile.load_catalog(path)
    } else {
        MoFile::default().load_catalog(path)
    };
    catalog.with_context(|| format!("Failed to read catalog {}", path.display()))
}

fn is_po(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("po"))
}

fn main() -> Result<()> {
    // Load .env file (ignored when the variables come from the environment)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("i18n_kit=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Compile {
            input,
            output,
            big_endian,
        } => {
            let catalog = PoFile
                .load_catalog(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let mo_file = if big_endian {
                MoFile::new(Endianness::Big)
            } else {
                config.mo_file()
            };
            mo_file
                .save(&output, &catalog)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                "Compiled {} entries into {} ({:?})",
                catalog.len(),
                output.display(),
                mo_file.endianness()
            );
        }
        Commands::Decompile {
            input,
            output,
            language,
        } => {
            let catalog = MoFile::default()
                .load_catalog(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let language = language.unwrap_or_else(|| config.language.clone());
            PoFile
                .save(&output, &catalog, &language.gettext_name())
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Decompiled {} entries into {}", catalog.len(), output.display());
        }
        Commands::Dump { file, context } => {
            let messages = load_catalog(&file)?.messages_for_context(&context);
            let sorted: std::collections::BTreeMap<_, _> = messages.into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&sorted)?);
        }
        Commands::Check { file } => {
            let report = PlaceholderValidator::validate_catalog(&load_catalog(&file)?);
            for warning in &report.warnings {
                println!("warning: {}", warning);
            }
            for error in &report.errors {
                println!("error: {}", error);
            }
            if report.has_errors() {
                bail!("{} invalid translation(s) in {}", report.errors.len(), file.display());
            }
            info!(
                "{} checked: {} warning(s)",
                file.display(),
                report.warnings.len()
            );
        }
        Commands::Format { pattern, args } => {
            let args: Args = args.into_iter().collect();
            let mut formatter = MessageFormatter::new();
            match formatter.format(&pattern, &args)? {
                Some(formatted) => println!("{}", formatted),
                None => bail!(
                    "{} (error code {})",
                    formatter.error_message(),
                    formatter.error_code()
                ),
            }
        }
        Commands::Translate {
            category,
            message,
            language,
            args,
        } => {
            let translator = config.translator();
            let language = language.unwrap_or_else(|| config.language.clone());
            let args: Args = args.into_iter().collect();
            let translated = translator.translate(&category, &message, &args, &language)?;
            println!("{}", translated);
            info!(
                "Lookup metrics: {}",
                serde_json::to_string(&translator.metrics().report())?
            );
        }
        Commands::ToJalali {
            date,
            format,
            persian,
            persian_digits,
        } => {
            let locale = if persian {
                CalendarLocale::Persian
            } else {
                CalendarLocale::Latin
            };
            let datetime = JalaliDateTime::from_gregorian(date.and_time(NaiveTime::default()))?;
            let formatter = DateFormatter::new(locale).with_persian_digits(persian_digits);
            println!("{}", formatter.format(&datetime, &format));
        }
        Commands::ToGregorian { date } => {
            println!("{}", date.to_gregorian().format("%Y-%m-%d"));
        }
    }

    Ok(())
}
