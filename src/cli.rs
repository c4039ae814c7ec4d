use anyhow::{anyhow, Result};
use clap::{Args, Parser, ValueEnum};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::detection_gateway::endpoints::{
    GatewayConfig, DEFAULT_API_KEY_ENV_VAR, DEFAULT_API_URL, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_MODEL_ID, DEFAULT_MODEL_VERSION, DEFAULT_OVERLAP_THRESHOLD, DEFAULT_TIMEOUT_SECS,
};
use crate::session::{Gender, Registration, Session};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Estimate calories and macros from a meal photo",
    long_about = None
)]
pub struct Cli {
    /// Path to a meal photo (JPEG or PNG). Repeat to process several uploads.
    #[arg(short, long = "image", required = true)]
    pub images: Vec<PathBuf>,

    #[command(flatten)]
    pub registration: RegistrationArgs,

    /// Already registered: skip the registration step
    #[arg(long, conflicts_with = "name")]
    pub skip_registration: bool,

    /// CSV file with extra nutrition rows (Name,Calories,Protein (g),Carbohydrates (g),Fat (g))
    #[arg(long)]
    pub nutrition_table: Option<PathBuf>,

    #[command(flatten)]
    pub gateway: GatewayArgs,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RegistrationArgs {
    /// Your name; providing it registers without prompting
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub age: Option<u32>,

    /// Height in cm
    #[arg(long)]
    pub height: Option<f64>,

    /// Weight in kg
    #[arg(long)]
    pub weight: Option<f64>,

    #[arg(long, value_enum)]
    pub gender: Option<Gender>,

    /// Health conditions (if any)
    #[arg(long)]
    pub health_conditions: Option<String>,
}

impl RegistrationArgs {
    /// `None` when no name was given, meaning the user still has to register.
    pub fn into_registration(self) -> Option<Registration> {
        let name = self.name?;
        Some(Registration {
            name,
            age: self.age.unwrap_or_default(),
            height_cm: self.height.unwrap_or_default(),
            weight_kg: self.weight.unwrap_or_default(),
            gender: self.gender.unwrap_or_default(),
            health_conditions: self.health_conditions.unwrap_or_default(),
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct GatewayArgs {
    /// Base URL of the hosted detection API
    #[arg(long, env = "ROBOFLOW_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, env = "ROBOFLOW_MODEL", default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    #[arg(long, env = "ROBOFLOW_MODEL_VERSION", default_value_t = DEFAULT_MODEL_VERSION)]
    pub model_version: u32,

    /// Environment variable that holds the API key
    #[arg(long, default_value = DEFAULT_API_KEY_ENV_VAR)]
    pub api_key_env: String,

    /// Minimum confidence (percent) for a detection
    #[arg(
        long,
        default_value_t = DEFAULT_CONFIDENCE_THRESHOLD,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub confidence: u8,

    /// Box overlap threshold (percent)
    #[arg(
        long,
        default_value_t = DEFAULT_OVERLAP_THRESHOLD,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub overlap: u8,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl GatewayArgs {
    pub fn to_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.api_url.clone(),
            model_id: self.model.clone(),
            model_version: self.model_version,
            api_key_env_var: self.api_key_env.clone(),
            confidence_threshold: self.confidence,
            overlap_threshold: self.overlap,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<String> {
    write!(output, "{}: ", question)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(anyhow!("Input ended before registration was complete"));
    }
    Ok(line.trim().to_string())
}

/// Asks until the answer parses; an empty answer means zero.
fn read_number<R, W, T>(input: &mut R, output: &mut W, question: &str) -> Result<T>
where
    R: BufRead,
    W: Write,
    T: std::str::FromStr + Default + PartialOrd,
{
    loop {
        let answer = read_answer(input, output, question)?;
        if answer.is_empty() {
            return Ok(T::default());
        }
        match answer.parse::<T>() {
            Ok(value) if value >= T::default() => return Ok(value),
            _ => writeln!(output, "Please enter a non-negative number.")?,
        }
    }
}

fn read_gender<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Gender> {
    loop {
        let answer = read_answer(input, output, "Gender [Male/Female]")?;
        if answer.is_empty() {
            return Ok(Gender::default());
        }
        match Gender::from_str(&answer, true) {
            Ok(gender) => return Ok(gender),
            Err(_) => writeln!(output, "Please answer Male or Female.")?,
        }
    }
}

/// Interactive registration form.
pub fn prompt_registration<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Registration> {
    writeln!(output, "Register - enter your details below:")?;
    let name = read_answer(input, output, "Name")?;
    let age = read_number(input, output, "Age")?;
    let height_cm = read_number(input, output, "Height (in cm)")?;
    let weight_kg = read_number(input, output, "Weight (in kg)")?;
    let gender = read_gender(input, output)?;
    let health_conditions = read_answer(input, output, "Health Conditions (if any)")?;

    Ok(Registration {
        name,
        age,
        height_cm,
        weight_kg,
        gender,
        health_conditions,
    })
}

/// Registers or logs in according to the flags, prompting on `input` only
/// when `interactive`. Prompts and the welcome line go to `output`.
pub fn register_session<R: BufRead, W: Write>(
    session: &mut Session,
    cli: &Cli,
    interactive: bool,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    if cli.skip_registration {
        session.login();
        return Ok(());
    }

    let registration = match cli.registration.clone().into_registration() {
        Some(registration) => registration,
        None if interactive => prompt_registration(input, output)?,
        None => {
            return Err(anyhow!(
                "Registration required: pass --name (and optional details) or --skip-registration"
            ))
        }
    };

    writeln!(output, "{}", session.register(registration))?;
    Ok(())
}
