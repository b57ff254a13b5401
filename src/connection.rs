use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::Error;

/// A RESP connection to a server. Bytes read from the socket are buffered by the codec until a
/// whole frame can be parsed.
pub struct Connection {
    pub id: Uuid,
    pub server_address: SocketAddr,
    framed: Framed<TcpStream, FrameCodec>,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        server_address: SocketAddr,
        max_frame_size: usize,
    ) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            server_address,
            framed: Framed::new(stream, FrameCodec::new(max_frame_size)),
        }
    }

    /// Reads the next frame. `None` means the server closed the connection between frames.
    ///
    /// Cancel safe: buffered bytes are kept when the future is dropped.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        self.framed.next().await.transpose()
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.framed.send(frame).await
    }

    /// Queues a frame without flushing, so several can go out in one write.
    pub async fn feed_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.framed.feed(frame).await
    }

    pub async fn flush(&mut self) -> Result<(), Error> {
        SinkExt::<Frame>::flush(&mut self.framed).await
    }
}
