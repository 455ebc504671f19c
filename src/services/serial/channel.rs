use std::{collections::HashMap, fmt, io, path::PathBuf, pin::Pin, time::Duration};

use async_trait::async_trait;
use tokio::{
    io::{
        AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
        BufReader,
    },
    net::TcpStream,
    time::{sleep, timeout},
};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, instrument, trace, warn};

use super::{LineParser, PortSettings, ResponseGrammar, TransportError};

/// One open command channel to a modem port.
#[async_trait]
pub trait AtChannel: Send {
    /// Send `AT{command}` and collect the reply up to its final result code.
    ///
    /// # Errors
    /// Returns the failing final result code or the channel I/O error
    async fn send_command(&mut self, command: &str) -> Result<String, TransportError>;

    /// Toggle the line state for `duration` to get the modem's attention.
    ///
    /// # Errors
    /// Returns `TransportError::Io` if the line state cannot be changed
    async fn flash(&mut self, duration: Duration) -> Result<(), TransportError>;

    /// Swallow the late reply to `command` after its exchange was abandoned.
    async fn recover(&mut self, command: &str);
}

/// Opens channels for ports by name.
///
/// Opening must not wait on the network or the device; anything slow is
/// deferred to the channel's first exchange.
pub trait ChannelOpener: Send + Sync + 'static {
    /// Open the channel behind `port`.
    ///
    /// # Errors
    /// Returns `TransportError::OpenFailed` if the endpoint is unusable
    fn open(&self, port: &str, settings: &PortSettings)
    -> Result<Box<dyn AtChannel>, TransportError>;
}

/// AT framing over any async byte stream.
///
/// Byte streams carry no modem-control lines, so a flash is the `+++` escape
/// sequence framed by guard time of the pulse duration.
pub struct StreamChannel<S> {
    port: String,
    grammar: ResponseGrammar,
    stream: BufReader<S>,
}

impl<S> StreamChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// How long a late reply is waited for once its command was abandoned.
    const STALE_REPLY_GRACE: Duration = Duration::from_secs(2);

    /// Wrap an already connected stream.
    pub fn new(port: &str, settings: &PortSettings, stream: S) -> Self {
        Self {
            port: port.to_owned(),
            grammar: settings.grammar,
            stream: BufReader::new(stream),
        }
    }

    fn io_error(&self, source: io::Error) -> TransportError {
        TransportError::Io {
            port: self.port.clone(),
            source,
        }
    }

    /// Drop buffered input and whatever keeps arriving until the line has
    /// been quiet for `quiet`.
    async fn drain_input(&mut self, quiet: Duration) {
        let mut discarded = self.stream.buffer().len();
        AsyncBufRead::consume(Pin::new(&mut self.stream), discarded);

        let mut chunk = [0u8; 256];
        loop {
            match timeout(quiet, self.stream.read(&mut chunk)).await {
                Ok(Ok(read)) if read > 0 => discarded += read,
                _ => break,
            }
        }

        if discarded > 0 {
            debug!(port = %self.port, bytes = discarded, "Discarding stale input");
        }
    }

    /// Next line of input. Bytes that are not UTF-8 are line noise and dropped.
    async fn read_line(&mut self) -> Result<String, TransportError> {
        let mut raw = Vec::new();
        let read = self
            .stream
            .read_until(b'\n', &mut raw)
            .await
            .map_err(|err| self.io_error(err))?;

        if read == 0 {
            return Err(self.io_error(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "channel closed by peer",
            )));
        }

        Ok(String::from_utf8_lossy(&raw).replace(char::REPLACEMENT_CHARACTER, ""))
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.stream
            .write_all(frame)
            .await
            .map_err(|err| self.io_error(err))?;
        self.stream.flush().await.map_err(|err| self.io_error(err))
    }
}

#[async_trait]
impl<S> AtChannel for StreamChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        self.drain_input(Duration::ZERO).await;
        trace!(port = %self.port, "--> AT{command}");
        self.write_frame(format!("AT{command}\r").as_bytes()).await?;

        let mut parser = LineParser::new(self.grammar, command);
        loop {
            let line = self.read_line().await?;
            trace!(port = %self.port, "<-- {}", line.trim_end());
            if let Some(outcome) = parser.feed(&line) {
                return outcome;
            }
        }
    }

    async fn flash(&mut self, duration: Duration) -> Result<(), TransportError> {
        sleep(duration).await;
        self.write_frame(b"+++").await?;
        sleep(duration).await;
        self.drain_input(duration).await;
        Ok(())
    }

    async fn recover(&mut self, command: &str) {
        let mut parser = LineParser::new(self.grammar, command);
        let swallowed = timeout(Self::STALE_REPLY_GRACE, async {
            while let Ok(line) = self.read_line().await {
                if parser.feed(&line).is_some() {
                    return true;
                }
            }
            false
        })
        .await;

        match swallowed {
            Ok(true) => debug!(port = %self.port, command, "Swallowed late reply"),
            Ok(false) => {}
            Err(_) => warn!(port = %self.port, command, "Late reply never arrived"),
        }
        self.drain_input(Duration::ZERO).await;
    }
}

/// Channel on a local serial device. A flash drops DTR.
struct SerialChannel {
    inner: StreamChannel<SerialStream>,
}

impl SerialChannel {
    fn set_dtr(&mut self, level: bool) -> Result<(), TransportError> {
        self.inner
            .stream
            .get_mut()
            .write_data_terminal_ready(level)
            .map_err(|err| self.inner.io_error(err.into()))
    }
}

#[async_trait]
impl AtChannel for SerialChannel {
    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        self.inner.send_command(command).await
    }

    async fn flash(&mut self, duration: Duration) -> Result<(), TransportError> {
        self.set_dtr(false)?;
        sleep(duration).await;
        self.set_dtr(true)?;
        self.inner.drain_input(duration).await;
        Ok(())
    }

    async fn recover(&mut self, command: &str) {
        self.inner.recover(command).await;
    }
}

/// Channel on a network serial bridge, connected on first use.
struct TcpChannel {
    port: String,
    address: String,
    settings: PortSettings,
    channel: Option<StreamChannel<TcpStream>>,
}

impl TcpChannel {
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

    fn new(port: &str, address: &str, settings: &PortSettings) -> Self {
        Self {
            port: port.to_owned(),
            address: address.to_owned(),
            settings: *settings,
            channel: None,
        }
    }

    fn open_failed(&self, reason: &str) -> TransportError {
        TransportError::OpenFailed {
            port: self.port.clone(),
            reason: format!("tcp://{}: {reason}", self.address),
        }
    }

    async fn connected(&mut self) -> Result<&mut StreamChannel<TcpStream>, TransportError> {
        let channel = match self.channel.take() {
            Some(channel) => channel,
            None => {
                let connect = TcpStream::connect(self.address.as_str());
                let stream = match timeout(Self::CONNECT_TIMEOUT, connect).await {
                    Ok(Ok(stream)) => stream,
                    Ok(Err(err)) => return Err(self.open_failed(&err.to_string())),
                    Err(_) => {
                        let reason = format!("no connection after {:?}", Self::CONNECT_TIMEOUT);
                        return Err(self.open_failed(&reason));
                    }
                };
                info!(port = %self.port, address = %self.address, "Bridge connected");
                StreamChannel::new(&self.port, &self.settings, stream)
            }
        };
        Ok(self.channel.insert(channel))
    }
}

#[async_trait]
impl AtChannel for TcpChannel {
    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        self.connected().await?.send_command(command).await
    }

    async fn flash(&mut self, duration: Duration) -> Result<(), TransportError> {
        self.connected().await?.flash(duration).await
    }

    async fn recover(&mut self, command: &str) {
        if let Some(channel) = self.channel.as_mut() {
            channel.recover(command).await;
        }
    }
}

/// Where a port's bytes flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Character device node
    Device(PathBuf),
    /// Network serial bridge, `host:port`
    Tcp(String),
}

impl Endpoint {
    /// Parse `tcp://host:port` or a device path.
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix("tcp://") {
            Some(address) => Endpoint::Tcp(address.to_owned()),
            None => Endpoint::Device(PathBuf::from(value)),
        }
    }

    /// Default endpoint of a kernel tty: `/dev/<port>`.
    pub fn for_port(port: &str) -> Self {
        Endpoint::Device(PathBuf::from("/dev").join(port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Device(path) => write!(f, "{}", path.display()),
            Endpoint::Tcp(address) => write!(f, "tcp://{address}"),
        }
    }
}

/// Opens serial devices and TCP bridges for ports.
#[derive(Debug, Default, Clone)]
pub struct EndpointOpener {
    endpoints: HashMap<String, Endpoint>,
}

impl EndpointOpener {
    /// Opener with explicit endpoints; other ports map to `/dev/<port>`.
    pub fn new(endpoints: HashMap<String, Endpoint>) -> Self {
        Self { endpoints }
    }

    /// Endpoint used for `port`.
    pub fn endpoint(&self, port: &str) -> Endpoint {
        self.endpoints
            .get(port)
            .cloned()
            .unwrap_or_else(|| Endpoint::for_port(port))
    }
}

impl ChannelOpener for EndpointOpener {
    #[instrument(skip(self))]
    fn open(
        &self,
        port: &str,
        settings: &PortSettings,
    ) -> Result<Box<dyn AtChannel>, TransportError> {
        let endpoint = self.endpoint(port);
        let open_failed = |reason: String| TransportError::OpenFailed {
            port: port.to_owned(),
            reason: format!("{endpoint}: {reason}"),
        };

        match &endpoint {
            Endpoint::Device(path) => {
                // serialport always opens with CLOCAL set
                if settings.carrier_detect {
                    return Err(open_failed("carrier detection cannot be enabled".to_owned()));
                }
                let stream = tokio_serial::new(path.to_string_lossy(), settings.baud_rate)
                    .open_native_async()
                    .map_err(|err| open_failed(err.to_string()))?;
                Ok(Box::new(SerialChannel {
                    inner: StreamChannel::new(port, settings, stream),
                }))
            }
            Endpoint::Tcp(address) => Ok(Box::new(TcpChannel::new(port, address, settings))),
        }
    }
}
