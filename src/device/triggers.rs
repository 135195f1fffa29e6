// Operator trigger source reading commands from stdin
use crate::automation::types::Trigger;
use crate::error::{BotError, BotResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Map one input line to a trigger: `1`/`start`, `0`/`stop`, `2`/`hold`
pub fn parse_trigger(line: &str) -> Option<Trigger> {
    match line.trim().to_ascii_lowercase().as_str() {
        "1" | "start" => Some(Trigger::Start),
        "0" | "stop" => Some(Trigger::Stop),
        "2" | "hold" => Some(Trigger::HoldToggle),
        _ => None,
    }
}

/// Forward input lines as triggers until the input ends.
///
/// Returns `BotError::ChannelClosed` when the receiver goes away first.
pub async fn forward_triggers<R>(reader: R, tx: &mpsc::Sender<Trigger>) -> BotResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(trigger) = parse_trigger(&line) else {
            log::warn!("⌨️ Unknown trigger '{}' (use 1/start, 0/stop, 2/hold)", line.trim());
            continue;
        };
        log::debug!("⌨️ Trigger {:?}", trigger);
        tx.send(trigger).await.map_err(|_| BotError::ChannelClosed)?;
    }
    Ok(())
}

/// Forward stdin lines as triggers until stdin closes or the receiver is dropped
pub fn spawn_stdin_triggers(tx: mpsc::Sender<Trigger>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match forward_triggers(BufReader::new(tokio::io::stdin()), &tx).await {
            Ok(()) => log::debug!("⌨️ stdin closed, no more triggers"),
            Err(e @ BotError::ChannelClosed) => log::debug!("⌨️ {e}"),
            Err(e) => log::warn!("⌨️ Failed to read stdin: {e}"),
        }
    })
}
