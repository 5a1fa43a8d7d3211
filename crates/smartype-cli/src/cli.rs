use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author = "smartype developers",
    version = env!("CARGO_PKG_VERSION"),
    about = "smartype - Live text substitution with smart punctuation",
    long_about = "smartype replaces trigger words with their substitutions as you type, and turns straight quotes and dashes into typographic ones."
)]
pub struct Smartype {
    #[clap(subcommand)]
    pub commands: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new substitution
    Add {
        #[clap(long, short = 's', help = "Trigger text to replace")]
        trigger: String,

        #[clap(long, short = 'c', help = "The replacement text")]
        replacement: String,
    },
    /// Delete a substitution by trigger
    Delete {
        #[clap(long, short = 's', help = "Trigger of the substitution to delete")]
        trigger: String,
    },
    /// Update the replacement of an existing substitution
    Update {
        #[clap(long, short = 's', help = "Trigger of the substitution to update")]
        trigger: String,

        #[clap(long, short = 'c', help = "New replacement text")]
        replacement: String,
    },
    /// Turn a substitution back on
    Enable {
        #[clap(long, short = 's', help = "Trigger of the substitution")]
        trigger: String,
    },
    /// Turn a substitution off without deleting it
    Disable {
        #[clap(long, short = 's', help = "Trigger of the substitution")]
        trigger: String,
    },
    /// List all substitutions and smart punctuation settings
    List,
    /// Turn smart quotes on or off
    SmartQuotes {
        #[clap(value_enum)]
        state: Toggle,
    },
    /// Turn smart dashes on or off
    SmartDashes {
        #[clap(value_enum)]
        state: Toggle,
    },
    /// Compile the preferences into a rule payload
    Compile {
        #[clap(long, short = 'o', help = "Write the payload here instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Type text into an in-memory field and print the result
    Type {
        #[clap(long, help = "Use a compiled payload instead of the preferences")]
        payload: Option<PathBuf>,

        #[clap(help = "Text to type; reads stdin line by line when omitted")]
        text: Option<String>,
    },
    /// Recompile whenever the preferences change, printing each payload
    Watch {
        #[clap(long, help = "Quiet period before recompiling, in milliseconds")]
        debounce_ms: Option<u64>,
    },
}
