use agency_portal::error::AppError;
use agency_portal::workflows::policies::{
    normalize_plate, parse_compiled, verdict_for_plate, BlockSplitter, CompiledPolicyText,
    PlateVerdict, PolicyRecord,
};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Where the compiled label text comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub(crate) struct PolicySource {
    /// Compiled label text, as stored on the client record
    #[arg(long)]
    pub(crate) text: Option<String>,
    /// File holding the compiled label text
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
}

impl PolicySource {
    fn load(self) -> Result<CompiledPolicyText, AppError> {
        match (self.text, self.file) {
            (Some(text), _) => Ok(CompiledPolicyText::new(text)),
            (None, Some(path)) => Ok(CompiledPolicyText::new(std::fs::read_to_string(path)?)),
            (None, None) => Ok(CompiledPolicyText::default()),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum SplitMode {
    /// Tokenize on `|` and re-merge fields into policies
    #[default]
    Delimited,
    /// Cut before every status glyph
    Glyph,
    /// Cut before status glyphs followed by a status keyword
    GatedGlyph,
}

impl SplitMode {
    fn splitter(self) -> BlockSplitter {
        match self {
            Self::Delimited => BlockSplitter::delimited(),
            Self::Glyph => BlockSplitter::glyph(),
            Self::GatedGlyph => BlockSplitter::gated_glyph(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct PolicyParseArgs {
    #[command(flatten)]
    pub(crate) source: PolicySource,
    /// Block splitting strategy
    #[arg(long, value_enum, default_value_t = SplitMode::Delimited)]
    pub(crate) split: SplitMode,
    /// Emit JSON instead of one line per policy
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PolicyMatchArgs {
    #[command(flatten)]
    pub(crate) source: PolicySource,
    /// Vehicle plate to look up
    #[arg(long)]
    pub(crate) plate: String,
    /// Block splitting strategy
    #[arg(long, value_enum, default_value_t = SplitMode::Delimited)]
    pub(crate) split: SplitMode,
}

pub(crate) fn run_policy_parse(args: PolicyParseArgs) -> Result<(), AppError> {
    let records = parse_compiled(&args.source.load()?, args.split.splitter());

    if args.json {
        let rendered = serde_json::to_string_pretty(&records).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{} policies found", records.len());
    for (index, record) in records.iter().enumerate() {
        println!("{}. {}", index + 1, describe(record));
    }
    Ok(())
}

pub(crate) fn run_policy_match(args: PolicyMatchArgs) -> Result<(), AppError> {
    let records = parse_compiled(&args.source.load()?, args.split.splitter());
    println!("{}", render_verdict(&records, &args.plate));
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "SI"
    } else {
        "NO"
    }
}

pub(crate) fn describe(record: &PolicyRecord) -> String {
    format!(
        "N° {} | {} | {} {} | {} | vida {} | auxilio {}",
        or_dash(&record.number),
        or_dash(&record.plate),
        or_dash(&record.vehicle_type),
        or_dash(&record.category),
        record.status.label(),
        yes_no(record.has_life_rider),
        yes_no(record.has_roadside_rider),
    )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub(crate) fn render_verdict(records: &[PolicyRecord], plate: &str) -> String {
    let plate = normalize_plate(plate);
    match verdict_for_plate(records, &plate) {
        PlateVerdict::Active(record) => format!("ACTIVE {plate}: {}", describe(record)),
        PlateVerdict::Inactive(record) => {
            format!("POLICY_INACTIVE {plate}: {}", describe(record))
        }
        PlateVerdict::NotFound => {
            format!("PATENTE_NOT_FOUND {plate}: none of {} policies", records.len())
        }
    }
}
