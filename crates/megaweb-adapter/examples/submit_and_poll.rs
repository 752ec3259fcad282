/*
[INPUT]:  Local Mega-Web server and a file URL
[OUTPUT]: Task handle and status updates until the task finishes
[POS]:    Examples - submit then poll
[UPDATE]: When the task endpoints change
*/

//! Submit a SaveFile task to a local Mega-Web server and poll it once per second.

use megaweb_adapter::{MegaWebClient, TaskPayload, TaskType};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = MegaWebClient::new()?;

    let payload: TaskPayload = [
        ("url", "https://example.com/files/archive.zip"),
        ("folder", "/tmp"),
    ]
    .into_iter()
    .collect();

    let handle = client.submit_task(TaskType::SaveFile, &payload).await?;
    println!("submitted task {handle}");

    loop {
        let record = client.task_status(&handle).await?;
        println!(
            "{handle} {} {}",
            record.task_status,
            record.task_result.as_deref().unwrap_or("-")
        );
        if record.task_status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Ok(())
}
