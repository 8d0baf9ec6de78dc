//! HTTP Server
//!
//! A small pool of workers, each accepting one connection at a time on the
//! HTTP port. A connection carries exactly one request: the head is read,
//! routed through the API and answered, then the socket is closed. With two
//! workers one can sit in `accept` while the other waits on the radar mutex.

use defmt::{info, warn};
use embassy_net::tcp::{Error as TcpError, TcpSocket};
use embassy_net::Stack;
use embassy_time::{Duration, Timer};
use embedded_io_async::Write;
use radar_rover::system::http::{Request, Response, Status, MAX_REQUEST_HEAD};

use super::RobotApi;

pub const HTTP_WORKER_COUNT: usize = 2;

#[embassy_executor::task(pool_size = HTTP_WORKER_COUNT)]
pub async fn http_worker(stack: Stack<'static>, api: &'static RobotApi, port: u16, worker_id: usize) {
    let mut rx_buf = [0u8; 1024];
    let mut tx_buf = [0u8; 2048];

    info!("HTTP worker {} starting (port={})", worker_id, port);

    loop {
        stack.wait_config_up().await;

        let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);
        socket.set_timeout(Some(Duration::from_secs(10)));

        match socket.accept(port).await {
            Ok(()) => {
                if let Err(e) = serve(&mut socket, api).await {
                    warn!("HTTP worker {} connection error: {:?}", worker_id, e);
                }
            }
            Err(e) => {
                warn!("HTTP worker {} accept error: {:?}", worker_id, e);
                Timer::after(Duration::from_millis(200)).await;
            }
        }

        socket.close();
        let _ = socket.flush().await;
        socket.abort();
    }
}

async fn serve(socket: &mut TcpSocket<'_>, api: &RobotApi) -> Result<(), TcpError> {
    let mut head = [0u8; MAX_REQUEST_HEAD];
    let mut total = 0;

    // Read until the end of the headers or a full buffer
    loop {
        let n = socket.read(&mut head[total..]).await?;
        if n == 0 {
            if total == 0 {
                return Ok(());
            }
            break;
        }
        total += n;
        if total == MAX_REQUEST_HEAD || head[..total].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let response = match Request::parse(&head[..total]) {
        Ok(request) => api.handle(&request).await,
        Err(e) => {
            warn!("unparseable request: {}", e);
            Response::text(Status::BadRequest, "Bad Request")
        }
    };

    socket.write_all(response.head().as_bytes()).await?;
    socket.write_all(response.body()).await?;
    socket.flush().await
}
