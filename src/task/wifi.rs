//! WiFi Access Point
//!
//! Brings up the CYW43 radio as a WPA2 access point and runs the network
//! stack on a static link-local address, so phones and laptops reach the
//! robot without any infrastructure.

use cyw43::{Control, NetDriver, PowerManagementMode};
use cyw43_pio::PioSpi;
use defmt::info;
use embassy_net::{Config, Ipv4Address, Ipv4Cidr, StaticConfigV4};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use radar_rover::config::NetworkConfig;

#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Static IPv4 configuration, no gateway and no DNS
pub fn net_config(network: &NetworkConfig) -> Config {
    let [a, b, c, d] = network.address;
    Config::ipv4_static(StaticConfigV4 {
        address: Ipv4Cidr::new(Ipv4Address::new(a, b, c, d), network.prefix_len),
        dns_servers: Default::default(),
        gateway: None,
    })
}

/// Loads the radio's country settings and opens the access point
pub async fn start_access_point(
    control: &mut Control<'static>,
    clm: &[u8],
    network: &NetworkConfig,
) {
    control.init(clm).await;
    control
        .set_power_management(PowerManagementMode::Performance)
        .await;
    control
        .start_ap_wpa2(network.ssid, network.passphrase, network.channel)
        .await;
    info!(
        "access point {} up on channel {}",
        network.ssid, network.channel
    );
}
