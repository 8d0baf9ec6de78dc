//! Drive Task
//!
//! Sole owner of the motors. Waits for commands from the HTTP handlers and
//! executes them; a command that cancels a running square path is executed
//! right after without waiting on the queue again.

use defmt::{error, info};
use embassy_time::Delay;

use super::{RobotDrive, RobotDriveQueue};

#[embassy_executor::task]
pub async fn drive(mut controller: RobotDrive, queue: &'static RobotDriveQueue) {
    let mut delay = Delay;
    let mut pending = None;
    info!("drive task ready");

    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => queue.wait().await,
        };

        match controller.execute(command, queue, &mut delay).await {
            Ok(next) => pending = next,
            Err(e) => {
                error!("drive command {} failed: {}", command, e);
                if let Err(e) = controller.stop() {
                    error!("motors could not be stopped: {}", e);
                }
            }
        }
    }
}
