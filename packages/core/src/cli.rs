use clap::Parser;

use crate::dashboard::session::UserAction;
use crate::dashboard::types::{FilterCriteria, FilterField};
use crate::insights::InsightsSource;

/// Trip Dashboard CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "trip-dashboard",
    version,
    about = "Terminal dashboard for paginated trip records and statistics"
)]
pub struct Cli {
    /// Trips API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Trips per page
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Where chart and insight data come from
    #[arg(long, value_enum)]
    pub insights: Option<InsightsSource>,

    /// Page to open first
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub min_distance: Option<String>,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    #[arg(long)]
    pub max_distance: Option<String>,

    #[arg(long)]
    pub min_fare: Option<String>,

    #[arg(long)]
    pub max_fare: Option<String>,

    /// Render once and exit instead of reading commands
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    pub fn filters(&self) -> FilterCriteria {
        [
            (FilterField::Date, &self.date),
            (FilterField::MinDistance, &self.min_distance),
            (FilterField::StartDate, &self.start_date),
            (FilterField::EndDate, &self.end_date),
            (FilterField::MaxDistance, &self.max_distance),
            (FilterField::MinFare, &self.min_fare),
            (FilterField::MaxFare, &self.max_fare),
        ]
        .into_iter()
        .fold(FilterCriteria::default(), |filters, (field, value)| match value {
            Some(value) => filters.with(field, value.as_str()),
            None => filters,
        })
    }
}

pub const HELP: &str = "\
commands:
  next | n                 next page
  prev | p                 previous page
  size <n>                 change page size
  filter key=value ...     apply filters (date, min_distance, start_date,
                           end_date, max_distance, min_fare, max_fare)
  enter key=value ...      same as filter, as if Enter was pressed in a field
  reload | r               retry the current page
  show                     print the dashboard again
  quit | q                 exit";

/// A line typed at the dashboard prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Action(UserAction),
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Show);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "next" | "n" => Command::Action(UserAction::NextPage),
        "prev" | "p" => Command::Action(UserAction::PreviousPage),
        "reload" | "r" => Command::Action(UserAction::Reload),
        "size" => {
            let size = words
                .next()
                .and_then(|raw| raw.parse::<u32>().ok())
                .ok_or_else(|| "usage: size <n>".to_string())?;
            Command::Action(UserAction::ChangePageSize(size))
        }
        "filter" => Command::Action(UserAction::ApplyFilters(parse_filters(words)?)),
        "enter" => Command::Action(UserAction::SubmitFilters(parse_filters(words)?)),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command: {} (try 'help')", other)),
    };

    Ok(command)
}

/// `key=value` pairs. A pair with an empty value clears that filter; an
/// empty list clears them all.
fn parse_filters<'a>(mut pairs: impl Iterator<Item = &'a str>) -> Result<FilterCriteria, String> {
    pairs.try_fold(FilterCriteria::default(), |filters, pair| {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{}'", pair))?;
        Ok(filters.with(key.parse::<FilterField>()?, value))
    })
}
