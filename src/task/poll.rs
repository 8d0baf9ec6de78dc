//! Radar Polling Task
//!
//! Advances the pan sweep every tick and lets a radar sweep take its samples.

use embassy_time::{Duration, Instant, Ticker};
use radar_rover::config::TICK_MS;

use super::SharedRadar;

#[embassy_executor::task]
pub async fn poll(radar: &'static SharedRadar) {
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();
        radar.lock().await.tick(now_ms).await;
    }
}
