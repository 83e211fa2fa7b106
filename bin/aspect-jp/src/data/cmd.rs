use aspect_provider::TxJoinPointRequest;
use clap::Parser;
use tracing::info;

use crate::common::{load_hex, print_json, JpError, Result};

/// Build the join-point request of a raw payload
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Payload, hex
    #[arg(value_name = "DATA")]
    pub data: Option<String>,

    /// File holding the payload. `-` reads from stdin.
    #[arg(long = "data.file", conflicts_with = "data")]
    pub data_file: Option<String>,
}

impl Cmd {
    /// Execute the data command
    pub fn run(&self) -> Result<()> {
        print_json(&self.build_request()?)
    }

    fn build_request(&self) -> Result<TxJoinPointRequest> {
        let data = load_hex(self.data.as_deref(), self.data_file.as_deref())?
            .ok_or_else(|| JpError::InvalidInput("no payload provided".to_string()))?;
        info!(len = data.len(), "Wrapping payload");
        Ok(TxJoinPointRequest::from_raw_bytes(data))
    }
}
