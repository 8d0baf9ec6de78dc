//! HTTP API
//!
//! Turns a routed request into an action on the robot and a response. Drive
//! commands are only queued; the drive task carries them out. Sensor and pan
//! routes lock the shared radar for the duration of the call.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::SquarePathConfig;
use crate::system::assets::AssetStore;
use crate::system::drive::{DriveCommand, DriveQueue};
use crate::system::hardware::{AngleServo, Clock, PulseTimer};
use crate::system::http::{Request, Response, Status};
use crate::system::pan::SweepMode;
use crate::system::radar::Radar;
use crate::system::report::DistanceReport;
use crate::system::router::{route, Route};

pub struct Api<'a, M: RawMutex, T, E, D, S, C> {
    radar: &'a Mutex<M, Radar<T, E, D, S>>,
    drive: &'a DriveQueue<M>,
    assets: Option<AssetStore>,
    square: SquarePathConfig,
    clock: C,
}

impl<'a, M, T, E, D, S, C> Api<'a, M, T, E, D, S, C>
where
    M: RawMutex,
    T: OutputPin,
    E: PulseTimer,
    D: DelayNs,
    S: AngleServo,
    C: Clock,
{
    /// `assets` is `None` when the bundle failed to mount; asset routes then
    /// answer 404.
    pub fn new(
        radar: &'a Mutex<M, Radar<T, E, D, S>>,
        drive: &'a DriveQueue<M>,
        assets: Option<AssetStore>,
        square: SquarePathConfig,
        clock: C,
    ) -> Self {
        Self {
            radar,
            drive,
            assets,
            square,
            clock,
        }
    }

    pub async fn handle(&self, request: &Request<'_>) -> Response {
        match route(request, &self.square) {
            Ok(route) => self.dispatch(route).await,
            Err(error) => {
                info!("{} {} rejected: {}", request.method, request.path, error);
                error.response()
            }
        }
    }

    async fn dispatch(&self, route: Route<'_>) -> Response {
        match route {
            Route::Asset(path) => match self.assets.and_then(|store| store.lookup(path)) {
                Some(asset) => Response::asset(asset),
                None => Response::text(Status::NotFound, "File Not Found"),
            },
            Route::Drive(command) => {
                info!("drive command {}", command);
                self.drive.signal(command);
                match command {
                    DriveCommand::Square(side_cm) => Response::text_fmt(
                        Status::Ok,
                        format_args!("Moving in square with side length: {side_cm} cm"),
                    ),
                    _ => Response::text(Status::Ok, "OK"),
                }
            }
            Route::ServoAngle(degrees) => {
                let mut radar = self.radar.lock().await;
                radar.pan().set_angle(degrees);
                let angle = radar.pan().angle();
                Response::text_fmt(Status::Ok, format_args!("Servo angle: {angle}"))
            }
            Route::ServoSweep(true) => {
                self.radar.lock().await.pan().start_sweep();
                Response::text(Status::Ok, "Sweep started")
            }
            Route::ServoSweep(false) => {
                self.radar.lock().await.pan().stop_sweep();
                Response::text(Status::Ok, "Sweep stopped")
            }
            Route::Radar(true) => {
                self.radar
                    .lock()
                    .await
                    .pan()
                    .start_sweep_mode(SweepMode::RangingSync);
                Response::text(Status::Ok, "Radar started")
            }
            Route::Radar(false) => {
                self.radar.lock().await.pan().recenter();
                Response::text(Status::Ok, "Radar stopped")
            }
            Route::RadarData => {
                let report = self.radar.lock().await.report(self.clock.now_ms()).await;
                Response::json(&report)
            }
            Route::Distance => {
                let now_ms = self.clock.now_ms();
                let distance = self.radar.lock().await.ranger().sample(now_ms).await;
                Response::json(&DistanceReport::new(distance, now_ms))
            }
            Route::SensorDiagnostics => {
                let now_ms = self.clock.now_ms();
                let diagnostics = self.radar.lock().await.ranger().diagnose(now_ms).await;
                Response::text_fmt(Status::Ok, format_args!("{diagnostics}"))
            }
        }
    }
}
