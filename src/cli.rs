use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api_connection::endpoints::DEFAULT_MODEL;
use crate::profile_store::DEFAULT_DATA_FILE;
use crate::recipe::{MealType, DEFAULT_TIME_LIMIT_MINUTES};

/// Usernames are trimmed and must not be blank, matching the web login.
fn parse_username(raw: &str) -> Result<String, String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err("username must not be empty".to_string());
    }
    Ok(username.to_string())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Pantry-aware recipe suggestions from a local model", long_about = None)]
pub struct Cli {
    /// Path to the JSON profile store
    #[arg(long, global = true, default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Model name served by the Ollama endpoint
    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Seconds to wait for the model before falling back
    #[arg(long, global = true, default_value_t = 180)]
    pub timeout_secs: u64,

    /// Never call the model; always use the local generator
    #[arg(long, global = true)]
    pub no_model: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web app
    Serve {
        #[arg(long, default_value = "0.0.0.0:8501")]
        bind: String,

        /// Skip checking (and pulling) the model at start-up
        #[arg(long)]
        skip_model_check: bool,
    },
    /// Suggest recipes for a user and record them in their history
    Recommend {
        #[arg(short, long, value_parser = parse_username)]
        user: String,

        #[arg(long, default_value = "dinner")]
        meal: MealType,

        #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_MINUTES)]
        time_limit: u32,

        #[arg(long, default_value_t = 1)]
        count: usize,

        #[arg(long, value_delimiter = ',')]
        must_use: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        mood: Vec<String>,

        #[arg(long = "constraint", value_delimiter = ',')]
        constraints: Vec<String>,

        /// Free-text request, e.g. "something warm with rice"
        request: Vec<String>,
    },
    /// Replace (or extend with --add) a user's pantry
    Pantry {
        #[arg(short, long, value_parser = parse_username)]
        user: String,

        #[arg(long)]
        add: bool,

        #[arg(value_delimiter = ',')]
        items: Vec<String>,
    },
    /// Update dietary preferences, allergies and constraints
    Preferences {
        #[arg(short, long, value_parser = parse_username)]
        user: String,

        /// Comma-separated dietary tags; an empty value clears them
        #[arg(long)]
        diet: Option<String>,

        /// Comma-separated allergies; an empty value clears them
        #[arg(long)]
        allergies: Option<String>,

        #[arg(long)]
        constraints: Option<String>,
    },
    /// Print a user's profile as JSON
    Show {
        #[arg(short, long, value_parser = parse_username)]
        user: String,
    },
    /// Make sure the configured model is present on the endpoint
    PullModel,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_args() {
        let cli = Cli::try_parse_from([
            "recipe_buddy",
            "--timeout-secs",
            "5",
            "recommend",
            "--user",
            "alex",
            "--meal",
            "lunch",
            "--must-use",
            "egg,rice",
            "something",
            "quick",
        ])
        .unwrap();
        assert_eq!(cli.timeout_secs, 5);
        match cli.command {
            Command::Recommend {
                user,
                meal,
                must_use,
                request,
                count,
                ..
            } => {
                assert_eq!(user, "alex");
                assert_eq!(meal, MealType::Lunch);
                assert_eq!(must_use, vec!["egg", "rice"]);
                assert_eq!(request.join(" "), "something quick");
                assert_eq!(count, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["recipe_buddy", "show", "--user", "sam", "--no-model"])
            .unwrap();
        assert!(cli.no_model);
        assert_eq!(cli.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn test_blank_user_is_rejected() {
        for user in ["", "   "] {
            for args in [
                vec!["recipe_buddy", "show", "--user", user],
                vec!["recipe_buddy", "pantry", "--user", user, "egg"],
                vec!["recipe_buddy", "preferences", "--user", user, "--diet", "vegan"],
                vec!["recipe_buddy", "recommend", "--user", user],
            ] {
                assert!(Cli::try_parse_from(args.clone()).is_err(), "accepted {:?}", args);
            }
        }
        let cli = Cli::try_parse_from(["recipe_buddy", "show", "-u", "  sam "]).unwrap();
        match cli.command {
            Command::Show { user } => assert_eq!(user, "sam"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_meal_is_rejected() {
        let parsed =
            Cli::try_parse_from(["recipe_buddy", "recommend", "--user", "a", "--meal", "brunch"]);
        assert!(parsed.is_err());
    }
}
