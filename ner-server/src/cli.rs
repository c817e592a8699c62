use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use ner::config::DeviceKind;
use ner::pipeline::AggregationStrategy;
use std::path::PathBuf;

/// CLI arguments for ner-server
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config_file: Option<PathBuf>,
    pub model_id: Option<String>,
    pub revision: Option<String>,
    pub model_path: Option<PathBuf>,
    pub device: Option<DeviceKind>,
    pub aggregation: Option<AggregationStrategy>,
    pub max_request_size: Option<usize>,
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Parse command line arguments
    pub fn parse() -> Self {
        let matches = Self::command().get_matches();

        // Handle special help for environment variables
        if matches.get_flag("help_env") {
            Self::print_env_help();
            std::process::exit(0);
        }

        Self::from_matches(&matches)
    }

    /// Parse arguments from an explicit list, program name first.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }

    /// The clap command definition.
    pub fn command() -> Command {
        Command::new("ner-server")
            .version(ner::VERSION)
            .about("HTTP API server for named entity recognition")
            .long_about(
                r#"NER Server loads a pretrained BERT token-classification model once at
startup and serves it over HTTP: POST a JSON array of strings to /ner and get
back one list of entities per string.

The server can be configured through command line arguments, environment
variables or a configuration file. Command line arguments take precedence over
environment variables, which take precedence over the file.

Examples:
  ner-server --port 8080
  ner-server --model-id dslim/bert-base-NER --aggregation simple
  ner-server --model-path ./models/swedish-ner --device cpu --log-level debug"#,
            )
            .arg(
                Arg::new("host")
                    .long("host")
                    .value_name("HOST")
                    .help("Address to bind to")
                    .long_help(
                        "Interface address for the HTTP server to bind to.
Environment variable: NER_HOST",
                    )
                    .value_hint(ValueHint::Hostname),
            )
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on")
                    .long_help(
                        "Port number for the HTTP server to listen on.
Environment variable: NER_PORT",
                    )
                    .value_hint(ValueHint::Other)
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .long_help(
                        "Path to a TOML, YAML or JSON configuration file with model,
pipeline and logging sections.
Environment variable: NER_CONFIG_FILE",
                    )
                    .value_hint(ValueHint::FilePath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("model_id")
                    .long("model-id")
                    .value_name("ID")
                    .help("Hugging Face model identifier")
                    .long_help(
                        "Identifier of the pretrained token-classification model on the
Hugging Face hub.
Environment variable: NER_MODEL__MODEL_ID",
                    )
                    .value_hint(ValueHint::Other),
            )
            .arg(
                Arg::new("revision")
                    .long("revision")
                    .value_name("REVISION")
                    .help("Model revision (branch, tag or commit)")
                    .long_help(
                        "Hub revision of the model to download.
Environment variable: NER_MODEL__REVISION",
                    )
                    .value_hint(ValueHint::Other),
            )
            .arg(
                Arg::new("model_path")
                    .long("model-path")
                    .value_name("DIR")
                    .help("Load the model from a local directory")
                    .long_help(
                        "Directory holding config.json, the tokenizer and the weights.
When set, the hub is not contacted.
Environment variable: NER_MODEL__LOCAL_PATH",
                    )
                    .value_hint(ValueHint::DirPath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("device")
                    .long("device")
                    .value_name("DEVICE")
                    .help("Inference device: auto, cpu, cuda or metal")
                    .long_help(
                        "Device to run inference on. auto prefers CUDA, then Metal, then the CPU.
Environment variable: NER_MODEL__DEVICE",
                    )
                    .value_parser(clap::value_parser!(DeviceKind)),
            )
            .arg(
                Arg::new("aggregation")
                    .long("aggregation")
                    .value_name("STRATEGY")
                    .help("Entity aggregation: none, simple, first, average or max")
                    .long_help(
                        "How token predictions are merged into entities. none returns one
entry per token with its raw tag.
Environment variable: NER_PIPELINE__AGGREGATION",
                    )
                    .value_parser(clap::value_parser!(AggregationStrategy)),
            )
            .arg(
                Arg::new("max_request_size")
                    .long("max-request-size")
                    .value_name("BYTES")
                    .help("Maximum request body size in bytes")
                    .long_help(
                        "Maximum size allowed for HTTP request bodies.
Larger requests will be rejected.
Environment variable: NER_MAX_REQUEST_SIZE",
                    )
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("log_level")
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Logging level")
                    .long_help(
                        "Set the logging level. Valid values: error, warn, info, debug, trace
Environment variable: RUST_LOG (takes precedence when set)",
                    )
                    .value_parser(["error", "warn", "info", "debug", "trace"]),
            )
            .arg(
                Arg::new("help_env")
                    .long("help-env")
                    .help("Show all environment variables")
                    .long_help(
                        "Display a comprehensive list of all environment variables
that can be used to configure the server.",
                    )
                    .action(ArgAction::SetTrue),
            )
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            host: matches.get_one::<String>("host").cloned(),
            port: matches.get_one::<u16>("port").copied(),
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            model_id: matches.get_one::<String>("model_id").cloned(),
            revision: matches.get_one::<String>("revision").cloned(),
            model_path: matches.get_one::<PathBuf>("model_path").cloned(),
            device: matches.get_one::<DeviceKind>("device").copied(),
            aggregation: matches
                .get_one::<AggregationStrategy>("aggregation")
                .copied(),
            max_request_size: matches.get_one::<usize>("max_request_size").copied(),
            log_level: matches.get_one::<String>("log_level").cloned(),
        }
    }

    /// Print comprehensive environment variable help
    fn print_env_help() {
        println!("NER Server Environment Variables");
        println!("================================");
        println!();
        println!("Server Configuration:");
        println!("  NER_HOST                      - Bind address (default: 0.0.0.0)");
        println!("  NER_PORT                      - Server port (default: 8000)");
        println!("  NER_MAX_REQUEST_SIZE          - Max request body size in bytes (default: 2MB)");
        println!("  NER_CONFIG_FILE               - Path to a configuration file");
        println!();
        println!("Model:");
        println!(
            "  NER_MODEL__MODEL_ID           - Hub model id (default: KB/bert-base-swedish-cased-ner)"
        );
        println!("  NER_MODEL__REVISION           - Hub revision (default: main)");
        println!("  NER_MODEL__LOCAL_PATH         - Load the model from this directory");
        println!("  NER_MODEL__CACHE_DIR          - Hub download cache directory");
        println!("  NER_MODEL__AUTH_TOKEN         - Hub access token for gated models");
        println!("  NER_MODEL__DEVICE             - auto, cpu, cuda or metal (default: auto)");
        println!("  NER_MODEL__MAX_SEQ_LENGTH     - Token window, longer inputs are truncated (default: 512)");
        println!();
        println!("Pipeline:");
        println!("  NER_PIPELINE__AGGREGATION     - none, simple, first, average, max (default: none)");
        println!();
        println!("Logging:");
        println!("  NER_LOGGING__LEVEL            - error, warn, info, debug, trace (default: info)");
        println!("  NER_LOGGING__FORMAT           - default, pretty, compact, json");
        println!("  NER_LOGGING__FILE             - Also write logs to this file");
        println!(
            "  RUST_LOG                      - Filter directives, overrides the configured level"
        );
        println!();
        println!("Note: Command line arguments take precedence over environment variables.");
        println!("Use --help for CLI argument documentation.");
    }
}
