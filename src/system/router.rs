//! Request Router
//!
//! Maps a parsed request to a [`Route`]. Routing is pure: parameters are
//! validated here, so a request that fails routing has no side effects.

use core::fmt;
use core::num::IntErrorKind;

use crate::config::SquarePathConfig;
use crate::system::drive::DriveCommand;
use crate::system::http::{Request, Response, Status, MAX_PARAM_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route<'a> {
    /// Static file of the web UI
    Asset(&'a str),
    /// Motion command, square path included
    Drive(DriveCommand),
    /// Direct pan angle, not yet clamped
    ServoAngle(i32),
    /// Plain sweep on or off
    ServoSweep(bool),
    /// Radar sweep on or off
    Radar(bool),
    RadarData,
    Distance,
    SensorDiagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteError {
    MethodNotAllowed,
    NotFound,
    MissingParam(&'static str),
    InvalidParam(&'static str),
}

impl RouteError {
    pub fn status(&self) -> Status {
        match self {
            RouteError::MethodNotAllowed => Status::MethodNotAllowed,
            RouteError::NotFound => Status::NotFound,
            RouteError::MissingParam(_) | RouteError::InvalidParam(_) => Status::BadRequest,
        }
    }

    pub fn response(&self) -> Response {
        Response::text_fmt(self.status(), format_args!("{self}"))
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::MethodNotAllowed => f.write_str("Method Not Allowed"),
            RouteError::NotFound => f.write_str("Not Found"),
            RouteError::MissingParam(name) => write!(f, "Missing {name} parameter"),
            RouteError::InvalidParam(name) => write!(f, "Invalid {name} parameter"),
        }
    }
}

/// Resolves a request to its route
pub fn route<'a>(request: &Request<'a>, square: &SquarePathConfig) -> Result<Route<'a>, RouteError> {
    if request.method != "GET" {
        return Err(RouteError::MethodNotAllowed);
    }

    match request.path {
        "/" | "/index.html" | "/style.css" | "/script.js" => Ok(Route::Asset(request.path)),
        "/cmd" => {
            let val = required(request, "val")?;
            val.chars()
                .next()
                .and_then(DriveCommand::from_code)
                .map(Route::Drive)
                .ok_or(RouteError::InvalidParam("val"))
        }
        "/square" => {
            let size = required(request, "size")?;
            let side = saturating_int(&size).ok_or(RouteError::InvalidParam("size"))?;
            Ok(Route::Drive(DriveCommand::Square(square.clamp_side(side))))
        }
        "/servo" => {
            if let Some(angle) = request.param("angle") {
                let degrees = saturating_int(&angle).ok_or(RouteError::InvalidParam("angle"))?;
                return Ok(Route::ServoAngle(degrees));
            }
            match request.param("auto").as_deref() {
                Some("start") => Ok(Route::ServoSweep(true)),
                Some("stop") => Ok(Route::ServoSweep(false)),
                Some(_) => Err(RouteError::InvalidParam("auto")),
                None => Err(RouteError::MissingParam("angle")),
            }
        }
        "/radar" => match required(request, "mode")?.as_str() {
            "start" => Ok(Route::Radar(true)),
            "stop" => Ok(Route::Radar(false)),
            _ => Err(RouteError::InvalidParam("mode")),
        },
        "/radar-data" => Ok(Route::RadarData),
        "/distance" => Ok(Route::Distance),
        "/test-sr04" => Ok(Route::SensorDiagnostics),
        _ => Err(RouteError::NotFound),
    }
}

/// Parses a decimal integer, pinning values past `i32` to its bounds so they
/// are clamped like any other out of range number
fn saturating_int(text: &str) -> Option<i32> {
    match text.parse::<i32>() {
        Ok(value) => Some(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i32::MAX),
            IntErrorKind::NegOverflow => Some(i32::MIN),
            _ => None,
        },
    }
}

fn required(
    request: &Request<'_>,
    name: &'static str,
) -> Result<heapless::String<MAX_PARAM_LEN>, RouteError> {
    request.param(name).ok_or(RouteError::MissingParam(name))
}
