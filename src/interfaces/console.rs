use crate::application::session::Teller;
use crate::error::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Drives the teller from stdin: one line in, one response out, until the
/// shutdown signal or end of input.
pub struct Console {
    teller: Teller,
}

impl Console {
    pub fn new(teller: Teller) -> Self {
        Self { teller }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(self.teller.start().as_bytes()).await?;
        stdout.flush().await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let response = self.teller.handle_input(&line).await?;
            stdout.write_all(response.text.as_bytes()).await?;
            stdout.flush().await?;
            if response.shutdown {
                break;
            }
        }
        Ok(())
    }
}
