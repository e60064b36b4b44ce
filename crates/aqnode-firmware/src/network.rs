//! WiFi station, DHCP network stack and telemetry upload
//!
//! [`start`] brings up the radio and spawns two tasks: the embassy-net runner
//! and a connection task that joins the configured network and rejoins it
//! whenever the link drops. The sampling loop only ever calls [`upload`] and
//! [`link_rssi`].

use core::cell::Cell;
use core::fmt::Write as _;

use alloc::string::String as AllocString;
use aqnode_core::config::{InternetConfig, PASSWORD_MAX_LEN, SSID_MAX_LEN};
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::{Config as NetConfig, DhcpConfig, Runner, Stack, StackResources};
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::Controller as RadioController;
use esp_radio::wifi::{self, ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};
use heapless::String;
use log::{debug, info, warn};
use reqwless::client::HttpClient;
use reqwless::request::{Method, RequestBuilder};
use static_cell::StaticCell;

use crate::app_state::{AppError, detail};

/// Twelve lowercase hex digits of the station MAC
pub const DEVICE_ID_LEN: usize = 12;
pub type DeviceId = String<DEVICE_ID_LEN>;

const RETRY_DELAY: Duration = Duration::from_secs(10);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const RSSI_POLL_INTERVAL: Duration = Duration::from_secs(30);

const HTTP_BUFFER_LEN: usize = 1024;

static RADIO_CONTROLLER: StaticCell<RadioController<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

/// Signal strength of the current association, `None` while disconnected
static LINK_RSSI: BlockingMutex<CriticalSectionRawMutex, Cell<Option<i32>>> =
    BlockingMutex::new(Cell::new(None));

pub struct Network {
    pub stack: Stack<'static>,
    pub device_id: DeviceId,
}

/// Bring up WiFi and the network stack for `internet`.
///
/// Returns as soon as the tasks are spawned; the link comes up in the
/// background.
pub fn start(
    spawner: &Spawner,
    wifi_peripheral: WIFI<'static>,
    internet: &InternetConfig,
) -> Result<Network, AppError> {
    let radio = esp_radio::init()
        .map_err(|e| AppError::Wifi(detail(format_args!("radio init: {:?}", e))))?;
    let radio = RADIO_CONTROLLER.init(radio);

    let (controller, interfaces) = wifi::new(radio, wifi_peripheral, Default::default())
        .map_err(|e| AppError::Wifi(detail(format_args!("driver init: {:?}", e))))?;

    let wifi_device: WifiDevice<'static> = interfaces.sta;
    let device_id = device_id(wifi_device.mac_address());
    info!("Device id {}", device_id);

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let resources = NET_RESOURCES.init(StackResources::new());
    let (stack, runner) = embassy_net::new(
        wifi_device,
        NetConfig::dhcpv4(DhcpConfig::default()),
        resources,
        seed,
    );

    let spawn_failed = |e| AppError::Wifi(detail(format_args!("spawn: {:?}", e)));
    spawner.spawn(net_task(runner).map_err(spawn_failed)?);
    spawner.spawn(
        wifi_task(
            controller,
            stack,
            internet.ssid.clone(),
            internet.password.clone(),
        )
        .map_err(spawn_failed)?,
    );

    Ok(Network { stack, device_id })
}

/// RSSI of the current WiFi association in dBm
pub fn link_rssi() -> Option<i32> {
    LINK_RSSI.lock(|rssi| rssi.get())
}

fn set_link_rssi(value: Option<i32>) {
    LINK_RSSI.lock(|rssi| rssi.set(value));
}

fn device_id(mac: [u8; 6]) -> DeviceId {
    let mut id = DeviceId::new();
    for byte in mac {
        let _ = write!(id, "{:02x}", byte);
    }
    id
}

/// POST `json` to `url`; returns the HTTP status on success.
pub async fn upload(stack: Stack<'static>, url: &str, json: &str) -> Result<u16, AppError> {
    if !stack.is_config_up() {
        return Err(AppError::Upload(detail(format_args!("network not up"))));
    }

    let mut rx_buffer = [0u8; HTTP_BUFFER_LEN];
    let client_state = TcpClientState::<1, HTTP_BUFFER_LEN, HTTP_BUFFER_LEN>::new();
    let tcp_client = TcpClient::new(stack, &client_state);
    let dns_client = DnsSocket::new(stack);
    let mut http_client = HttpClient::new(&tcp_client, &dns_client);

    debug!("POST {} {}", url, json);
    let headers = [("Content-Type", "application/json")];
    let mut request = http_client
        .request(Method::POST, url)
        .await
        .map_err(|e| AppError::Upload(detail(format_args!("request: {:?}", e))))?
        .headers(&headers)
        .body(json.as_bytes());

    let response = request
        .send(&mut rx_buffer)
        .await
        .map_err(|e| AppError::Upload(detail(format_args!("send: {:?}", e))))?;

    let status = response.status.0;
    if (200..300).contains(&status) {
        Ok(status)
    } else {
        Err(AppError::Upload(detail(format_args!("HTTP status {}", status))))
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

#[embassy_executor::task]
async fn wifi_task(
    mut controller: WifiController<'static>,
    stack: Stack<'static>,
    ssid: String<SSID_MAX_LEN>,
    password: String<PASSWORD_MAX_LEN>,
) {
    loop {
        if !matches!(controller.is_started(), Ok(true)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(AllocString::from(ssid.as_str()))
                    .with_password(AllocString::from(password.as_str())),
            );

            if let Err(e) = controller.set_config(&client_config) {
                warn!("WiFi set_config failed: {:?}", e);
                Timer::after(RETRY_DELAY).await;
                continue;
            }

            info!("Starting WiFi station");
            if let Err(e) = controller.start_async().await {
                warn!("WiFi start failed: {:?}", e);
                Timer::after(RETRY_DELAY).await;
                continue;
            }
        }

        info!("Connecting to '{}'", ssid);
        if let Err(e) = controller.connect_async().await {
            warn!("WiFi connect failed: {:?}", e);
            Timer::after(RETRY_DELAY).await;
            continue;
        }

        stack.wait_config_up().await;
        if let Some(config) = stack.config_v4() {
            info!("WiFi link up, address {}", config.address);
        }

        loop {
            if let Ok(rssi) = controller.rssi() {
                set_link_rssi(Some(rssi));
            }

            let disconnected = select(
                controller.wait_for_event(WifiEvent::StaDisconnected),
                Timer::after(RSSI_POLL_INTERVAL),
            )
            .await;
            if let Either::First(_) = disconnected {
                break;
            }
        }

        set_link_rssi(None);
        warn!("WiFi disconnected; reconnecting");
        Timer::after(RECONNECT_DELAY).await;
    }
}
