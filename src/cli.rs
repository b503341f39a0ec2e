use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Browse AI tools by what you want to do", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search tools by meaning and/or category
    Search {
        /// What you want to do, e.g. "generate blog posts".
        /// Omit to list tools in catalog order.
        query: Option<String>,

        /// Only show tools in this category
        #[clap(short, long, default_value = "All")]
        category: String,

        /// Print results as json
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// List the category filter options
    Categories {},
    /// Start toolhub as a service.
    Serve {
        /// Address to listen on (overrides web.listen in config.yaml)
        #[clap(short, long)]
        listen: Option<String>,
    },
}
