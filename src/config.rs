use crate::app_dirs::AppDirs;
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Fewest rows a playable config may have: two operations and the `=` row.
pub const MIN_ROWS: usize = 3;

/// Largest absolute value a row bound or any running result may reach.
pub const MAX_MAGNITUDE: i64 = 1_000_000_000_000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Operator {
    #[serde(rename = "+")]
    #[strum(serialize = "+")]
    Add,
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    Sub,
    #[serde(rename = "*")]
    #[strum(serialize = "*")]
    Mul,
    #[serde(rename = "/")]
    #[strum(serialize = "/")]
    Div,
    #[serde(rename = "=")]
    #[strum(serialize = "=")]
    Equals,
}

impl Operator {
    pub const ARITHMETIC: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn is_arithmetic(self) -> bool {
        self != Operator::Equals
    }

    /// Applies the operator left-to-right. `=` contributes no arithmetic and
    /// yields `lhs`. Returns `None` only for division by zero.
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Operator::Add => Some(lhs.saturating_add(rhs)),
            Operator::Sub => Some(lhs.saturating_sub(rhs)),
            Operator::Mul => Some(lhs.saturating_mul(rhs)),
            // truncating, like integer division everywhere else in the game
            Operator::Div => lhs.checked_div(rhs),
            Operator::Equals => Some(lhs),
        }
    }

    /// Next arithmetic operator in `+ - * /` order, wrapping around.
    pub fn cycle(self) -> Operator {
        match self {
            Operator::Add => Operator::Sub,
            Operator::Sub => Operator::Mul,
            Operator::Mul => Operator::Div,
            Operator::Div => Operator::Add,
            Operator::Equals => Operator::Equals,
        }
    }
}

impl FromStr for Operator {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Sub),
            "*" => Ok(Operator::Mul),
            "/" => Ok(Operator::Div),
            "=" => Ok(Operator::Equals),
            other => Err(GameError::ConfigLoad(format!("unknown sign '{}'", other))),
        }
    }
}

/// One row of the equation config: the range of the number it contributes and
/// the operator written after that number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRow {
    pub min: i64,
    pub max: i64,
    pub operator: Operator,
}

impl ConfigRow {
    pub fn new(min: i64, max: i64, operator: Operator) -> Self {
        Self { min, max, operator }
    }
}

impl fmt::Display for ConfigRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.min, self.max, self.operator)
    }
}

/// A validated config: at least [`MIN_ROWS`] rows, `=` on the last row and
/// nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    rows: Vec<ConfigRow>,
}

impl GameConfig {
    pub fn new(rows: Vec<ConfigRow>) -> Result<Self> {
        if rows.len() < MIN_ROWS {
            return Err(GameError::InvalidConfig(format!(
                "need at least {} rows, got {}",
                MIN_ROWS,
                rows.len()
            )));
        }
        let last = rows.len() - 1;
        for (idx, row) in rows.iter().enumerate() {
            match (idx == last, row.operator) {
                (true, Operator::Equals) | (false, Operator::Add | Operator::Sub | Operator::Mul | Operator::Div) => {}
                (true, op) => {
                    return Err(GameError::InvalidConfig(format!(
                        "last row must be '=', found '{}'",
                        op
                    )))
                }
                (false, _) => {
                    return Err(GameError::InvalidConfig(format!(
                        "row {} uses '=' before the last row",
                        idx + 1
                    )))
                }
            }
        }
        if magnitude_bound(&rows).is_none() {
            return Err(GameError::InvalidConfig(format!(
                "results could exceed {} in magnitude",
                MAX_MAGNITUDE
            )));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ConfigRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ConfigRow> {
        self.rows
    }

    /// Serializes back to the `min;max;sign` text format.
    pub fn to_text(&self) -> String {
        self.rows.iter().map(|row| format!("{}\n", row)).collect()
    }
}

/// Worst-case `|running result|` over every draw the rows allow, or `None`
/// once it passes [`MAX_MAGNITUDE`]. Divisors are drawn from `1..`, so `/`
/// never grows the bound.
fn magnitude_bound(rows: &[ConfigRow]) -> Option<i128> {
    let limit = i128::from(MAX_MAGNITUDE);
    let row_bound = |row: &ConfigRow| {
        let m = i128::from(row.min).abs().max(i128::from(row.max).abs()).max(1);
        (m <= limit).then_some(m)
    };

    let mut bound = row_bound(rows.first()?)?;
    for pair in rows.windows(2) {
        let m = row_bound(&pair[1])?;
        bound = match pair[0].operator {
            Operator::Add | Operator::Sub => bound + m,
            Operator::Mul => bound * m,
            Operator::Div | Operator::Equals => bound,
        };
        if bound > limit {
            return None;
        }
    }
    Some(bound)
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: vec![
                ConfigRow::new(7, 20, Operator::Add),
                ConfigRow::new(7, 20, Operator::Sub),
                ConfigRow::new(7, 20, Operator::Equals),
            ],
        }
    }
}

/// Parses the plain-text config: one `min;max;sign` row per line.
pub fn parse_config_text(text: &str) -> Result<GameConfig> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() != 3 {
            return Err(GameError::ConfigLoad(format!(
                "line {}: expected 'min;max;sign', got '{}'",
                line_no + 1,
                line
            )));
        }
        let parse_bound = |field: &str| {
            field.trim().parse::<i64>().map_err(|e| {
                GameError::ConfigLoad(format!("line {}: bad number '{}': {}", line_no + 1, field, e))
            })
        };
        let operator = fields[2].parse::<Operator>().map_err(|e| {
            GameError::ConfigLoad(format!("line {}: {}", line_no + 1, e))
        })?;
        rows.push(ConfigRow::new(parse_bound(fields[0])?, parse_bound(fields[1])?, operator));
    }
    GameConfig::new(rows).map_err(|e| GameError::ConfigLoad(e.to_string()))
}

pub fn load_config_text<P: AsRef<Path>>(path: P) -> Result<GameConfig> {
    let text = fs::read_to_string(path.as_ref()).map_err(|e| {
        GameError::ConfigLoad(format!("{}: {}", path.as_ref().display(), e))
    })?;
    parse_config_text(&text)
}

/// Picks the config for this process: the persisted override if present and
/// valid, then the text file, then the built-in default.
pub fn resolve_config(settings: &Settings, text_path: Option<&Path>) -> GameConfig {
    if let Some(rows) = &settings.config_override {
        match GameConfig::new(rows.clone()) {
            Ok(cfg) => {
                log::info!("using saved config override ({} rows)", cfg.rows().len());
                return cfg;
            }
            Err(e) => log::warn!("ignoring saved config override: {}", e),
        }
    }

    if let Some(path) = text_path {
        match load_config_text(path) {
            Ok(cfg) => {
                log::info!("loaded config from {}", path.display());
                return cfg;
            }
            Err(e) => log::warn!("{}; falling back to default config", e),
        }
    }

    GameConfig::default()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub player_name: String,
    pub config_override: Option<Vec<ConfigRow>>,
}

impl Settings {
    pub fn congratulation(&self) -> String {
        let name = self.player_name.trim();
        if name.is_empty() {
            "Well done, all steps solved!".to_string()
        } else {
            format!("Well done, {}! All steps solved!", name)
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        let path = AppDirs::settings_path().unwrap_or_else(|| PathBuf::from("arcmath_settings.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Settings>(&bytes) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("unreadable settings at {}: {}", self.path.display(), e),
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
