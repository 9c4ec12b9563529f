use clap::Subcommand;
use model::store::{StoreState, SwitchMode};

#[derive(Subcommand)]
pub enum Commands {
    /// Import records while keeping the cluster in import mode
    Import {
        #[arg(long, help = "Config file path")]
        config: String,

        #[arg(long, help = "JSON lines file of {\"key\", \"value\"} string records")]
        input: String,

        #[arg(
            long,
            help = "If specified, writes the JSON summary to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Assert an ingest mode on every qualifying store once
    SwitchMode {
        #[arg(long, help = "Config file path")]
        config: String,

        /// Target mode: "import" or "normal"
        #[arg(long)]
        mode: SwitchMode,
    },
    /// List the stores known to the configured directory
    Stores {
        #[arg(long, help = "Config file path")]
        config: String,

        /// Only show stores at or above this state
        #[arg(long)]
        min_state: Option<StoreState>,
    },
}
