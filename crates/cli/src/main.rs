use clap::{Parser, Subcommand};
use era_core::{
    fallback::FALLBACK_HTML, normalise::normalise_offline, RawProviderResponse, WebpageRequest,
    WebpageService,
};

#[derive(Parser)]
#[command(name = "era")]
#[command(about = "ERA webpage generator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generation prompt for a set of experiment parameters
    Prompt {
        /// What the participant does that triggers the survey redirect
        #[arg(long)]
        redirect: Option<String>,
        /// Data point to track (choice, allClicks, decisionTime, maxScroll); repeatable
        #[arg(long = "data-point")]
        data_points: Vec<String>,
        /// Changes to make to the page in the screenshot
        #[arg(long)]
        modifications: Option<String>,
        /// "Yes" when several experiment versions are needed
        #[arg(long)]
        multiple_versions: Option<String>,
        /// How the versions differ
        #[arg(long)]
        version_difference: Option<String>,
        /// Survey URL the page redirects to
        #[arg(long)]
        qualtrics_url: Option<String>,
    },
    /// Normalise a saved provider response into an HTML document
    Normalize {
        /// File holding the raw response body (JSON or plain text)
        file: std::path::PathBuf,
    },
    /// Print the fallback document
    Fallback,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Prompt {
            redirect,
            data_points,
            modifications,
            multiple_versions,
            version_difference,
            qualtrics_url,
        }) => {
            let request = WebpageRequest {
                email: None,
                redirect,
                data_points,
                modifications,
                multiple_versions,
                version_difference,
                qualtrics_url,
            };
            println!("{}", WebpageService::select_prompt(&request));
        }
        Some(Commands::Normalize { file }) => {
            let body = std::fs::read_to_string(&file)?;
            let document = normalise_offline(&RawProviderResponse::from_body(&body));
            eprintln!("origin: {:?}", document.origin());
            println!("{}", document.as_str());
        }
        Some(Commands::Fallback) => {
            print!("{}", FALLBACK_HTML);
        }
        None => {
            println!("Use --help for usage");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prompt_collects_repeated_data_points() {
        let cli = Cli::try_parse_from([
            "era",
            "prompt",
            "--data-point",
            "choice",
            "--data-point",
            "maxScroll",
            "--multiple-versions",
            "No",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Prompt {
                data_points,
                multiple_versions,
                ..
            }) => {
                assert_eq!(data_points, vec!["choice", "maxScroll"]);
                assert_eq!(multiple_versions.as_deref(), Some("No"));
            }
            _ => panic!("expected the prompt subcommand"),
        }
    }
}
