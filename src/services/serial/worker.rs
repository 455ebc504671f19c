use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{sync::mpsc, task::JoinHandle, time::timeout};
use tracing::{debug, info, instrument, warn};

use super::{
    AtChannel, ChannelOpener, CommandQueue, FlashDone, PortSettings, Queued, Reply, Responder,
    TransportError, queued,
};

/// Work items processed by a port's worker, strictly in arrival order.
enum Job {
    Command {
        command: String,
        timeout: Duration,
        cached: bool,
        reply: Responder<String>,
    },
    Flash {
        duration: Duration,
        done: Responder<()>,
    },
}

struct PortWorker {
    jobs: mpsc::UnboundedSender<Job>,
    task: JoinHandle<()>,
}

/// Command queue with one worker task per open port.
///
/// Each worker owns its channel and reply cache, so the cache lives exactly
/// as long as one open session of the port.
pub struct SerialQueue {
    opener: Arc<dyn ChannelOpener>,
    workers: Mutex<HashMap<String, PortWorker>>,
}

impl SerialQueue {
    /// Create a queue opening channels through `opener`.
    pub fn new(opener: impl ChannelOpener) -> Self {
        Self {
            opener: Arc::new(opener),
            workers: Mutex::new(HashMap::new()),
        }
    }

    fn workers(&self) -> MutexGuard<'_, HashMap<String, PortWorker>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit<T>(&self, port: &str, job: impl FnOnce(Responder<T>) -> Job) -> Queued<T> {
        let workers = self.workers();
        let Some(worker) = workers.get(port) else {
            return Queued::ready(port, Err(TransportError::NotOpen(port.to_owned())));
        };

        let (responder, handle) = queued(port);
        // A worker that already exited drops the job, which resolves the handle as closed.
        let _ = worker.jobs.send(job(responder));
        handle
    }

    fn enqueue_command(&self, port: &str, command: &str, timeout: Duration, cached: bool) -> Reply {
        debug!(port, command, ?timeout, cached, "Queueing command");
        self.submit(port, |reply| Job::Command {
            command: command.to_owned(),
            timeout,
            cached,
            reply,
        })
    }
}

impl CommandQueue for SerialQueue {
    fn open(&self, port: &str, settings: &PortSettings) -> Result<(), TransportError> {
        if self.is_open(port) {
            return Ok(());
        }

        let channel = self.opener.open(port, settings)?;
        let mut workers = self.workers();
        if workers.contains_key(port) {
            return Ok(());
        }
        let (jobs, job_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_port(port.to_owned(), channel, job_rx));
        workers.insert(port.to_owned(), PortWorker { jobs, task });

        info!(port, "Port opened");
        Ok(())
    }

    fn close(&self, port: &str) {
        if let Some(worker) = self.workers().remove(port) {
            worker.task.abort();
            info!(port, "Port closed");
        }
    }

    fn is_open(&self, port: &str) -> bool {
        self.workers().contains_key(port)
    }

    fn queue(&self, port: &str, command: &str, timeout: Duration) -> Reply {
        self.enqueue_command(port, command, timeout, false)
    }

    fn queue_cached(&self, port: &str, command: &str, timeout: Duration) -> Reply {
        self.enqueue_command(port, command, timeout, true)
    }

    fn flash(&self, port: &str, duration: Duration) -> FlashDone {
        debug!(port, ?duration, "Queueing flash");
        self.submit(port, |done| Job::Flash { duration, done })
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        for (_, worker) in self.workers().drain() {
            worker.task.abort();
        }
    }
}

#[instrument(skip(channel, jobs))]
async fn run_port(
    port: String,
    mut channel: Box<dyn AtChannel>,
    mut jobs: mpsc::UnboundedReceiver<Job>,
) {
    let mut cache: HashMap<String, String> = HashMap::new();

    while let Some(job) = jobs.recv().await {
        match job {
            Job::Command {
                command,
                timeout: limit,
                cached,
                reply,
            } => {
                if cached && let Some(hit) = cache.get(&command) {
                    debug!(command, "Answered from cache");
                    reply.respond(Ok(hit.clone()));
                    continue;
                }

                let result = match timeout(limit, channel.send_command(&command)).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout {
                        command: command.clone(),
                        timeout: limit,
                    }),
                };
                let timed_out = matches!(result, Err(TransportError::Timeout { .. }));

                match &result {
                    Ok(response) if cached => {
                        cache.insert(command.clone(), response.clone());
                    }
                    Ok(_) => {}
                    Err(err) => warn!(command, error = %err, "Command failed"),
                }
                reply.respond(result);

                if timed_out {
                    channel.recover(&command).await;
                }
            }
            Job::Flash { duration, done } => {
                done.respond(channel.flash(duration).await);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, duplex},
        time::sleep,
    };

    use super::*;
    use crate::services::serial::StreamChannel;

    /// Opens in-memory channels backed by a scripted fake modem.
    struct FakeModemOpener {
        replies: HashMap<&'static str, &'static str>,
        exchanges: Arc<AtomicUsize>,
    }

    impl FakeModemOpener {
        fn new(replies: &[(&'static str, &'static str)]) -> Self {
            Self {
                replies: replies.iter().copied().collect(),
                exchanges: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    /// Scripted replies: `<silence>` never answers, a `<late>` prefix answers
    /// four seconds after the command. The `+++` escape is answered with `OK`.
    async fn fake_modem(
        stream: DuplexStream,
        replies: HashMap<&'static str, &'static str>,
        exchanges: Arc<AtomicUsize>,
    ) {
        let mut stream = BufReader::new(stream);
        let mut frame = Vec::new();
        loop {
            let escape = match stream.fill_buf().await {
                Ok([]) | Err(_) => return,
                Ok(buffered) => buffered.starts_with(b"+++"),
            };
            if escape {
                stream.consume(3);
                let _ = stream.write_all(b"\r\nOK\r\n").await;
                continue;
            }

            frame.clear();
            match stream.read_until(b'\r', &mut frame).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            let command = String::from_utf8_lossy(&frame);
            let command = command.trim().trim_start_matches("AT");
            exchanges.fetch_add(1, Ordering::SeqCst);

            let reply = match replies.get(command) {
                Some(&"<silence>") => continue,
                Some(reply) => match reply.strip_prefix("<late>") {
                    Some(late) => {
                        sleep(Duration::from_secs(4)).await;
                        format!("\r\n{late}\r\n\r\nOK\r\n")
                    }
                    None => format!("\r\n{reply}\r\n\r\nOK\r\n"),
                },
                None => "\r\nERROR\r\n".to_owned(),
            };
            let _ = stream.write_all(reply.as_bytes()).await;
        }
    }

    impl ChannelOpener for FakeModemOpener {
        fn open(
            &self,
            port: &str,
            settings: &PortSettings,
        ) -> Result<Box<dyn AtChannel>, TransportError> {
            let (client, modem) = duplex(1024);
            tokio::spawn(fake_modem(
                modem,
                self.replies.clone(),
                Arc::clone(&self.exchanges),
            ));
            Ok(Box::new(StreamChannel::new(port, settings, client)))
        }
    }

    fn queue_with(replies: &[(&'static str, &'static str)]) -> (SerialQueue, Arc<AtomicUsize>) {
        let opener = FakeModemOpener::new(replies);
        let exchanges = Arc::clone(&opener.exchanges);
        (SerialQueue::new(opener), exchanges)
    }

    const TIMEOUT: Duration = Duration::from_secs(3);

    #[tokio::test]
    async fn commands_on_unopened_port_fail() {
        let (queue, _) = queue_with(&[]);
        assert!(matches!(
            queue.queue("ttyUSB0", "+CSQ", TIMEOUT).await,
            Err(TransportError::NotOpen(_))
        ));
    }

    #[tokio::test]
    async fn replies_arrive_in_enqueue_order() {
        let (queue, _) = queue_with(&[("+GMI", "+GMI: Novatel"), ("+GMM", "+GMM: S720")]);
        queue.open("ttyUSB0", &PortSettings::default()).unwrap();

        let first = queue.queue("ttyUSB0", "+GMI", TIMEOUT);
        let second = queue.queue("ttyUSB0", "+GMM", TIMEOUT);
        let third = queue.queue("ttyUSB0", "+GMR", TIMEOUT);

        assert_eq!(first.await.unwrap(), "+GMI: Novatel");
        assert_eq!(second.await.unwrap(), "+GMM: S720");
        assert!(matches!(third.await, Err(TransportError::Final(_))));
    }

    #[tokio::test]
    async fn cached_commands_skip_the_round_trip_until_close() {
        let (queue, exchanges) = queue_with(&[("+GSN", "+GSN: 0x1234ABCD")]);
        let settings = PortSettings::default();
        queue.open("ttyUSB0", &settings).unwrap();

        for _ in 0..3 {
            let esn = queue.queue_cached("ttyUSB0", "+GSN", TIMEOUT).await.unwrap();
            assert_eq!(esn, "+GSN: 0x1234ABCD");
        }
        assert_eq!(exchanges.load(Ordering::SeqCst), 1);

        queue.close("ttyUSB0");
        queue.open("ttyUSB0", &settings).unwrap();
        queue.queue_cached("ttyUSB0", "+GSN", TIMEOUT).await.unwrap();
        assert_eq!(exchanges.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_replies_are_not_cached() {
        let (queue, exchanges) = queue_with(&[]);
        queue.open("ttyUSB0", &PortSettings::default()).unwrap();

        assert!(queue.queue_cached("ttyUSB0", "+GMR", TIMEOUT).await.is_err());
        assert!(queue.queue_cached("ttyUSB0", "+GMR", TIMEOUT).await.is_err());
        assert_eq!(exchanges.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_modem_times_out() {
        let (queue, _) = queue_with(&[("+CSQ", "<silence>")]);
        queue.open("ttyUSB0", &PortSettings::default()).unwrap();

        match queue.queue("ttyUSB0", "+CSQ", TIMEOUT).await {
            Err(TransportError::Timeout { command, timeout }) => {
                assert_eq!(command, "+CSQ");
                assert_eq!(timeout, TIMEOUT);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn closing_resolves_outstanding_commands_as_closed() {
        let (queue, _) = queue_with(&[("DT5551234", "<silence>")]);
        queue.open("ttyUSB0", &PortSettings::default()).unwrap();

        let dial = queue.queue("ttyUSB0", "DT5551234", Duration::from_secs(60));
        let queued_behind = queue.queue("ttyUSB0", "+CSQ", TIMEOUT);
        tokio::task::yield_now().await;
        queue.close("ttyUSB0");

        assert!(!queue.is_open("ttyUSB0"));
        assert!(matches!(dial.await, Err(TransportError::Closed(_))));
        assert!(matches!(queued_behind.await, Err(TransportError::Closed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn flash_completes_after_guard_time() {
        let (queue, _) = queue_with(&[]);
        queue.open("ttyUSB0", &PortSettings::default()).unwrap();

        let started = tokio::time::Instant::now();
        queue
            .flash("ttyUSB0", Duration::from_millis(100))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_does_not_shift_following_replies() {
        let (queue, _) = queue_with(&[
            ("+CSQ", "<late>+CSQ: 20,99"),
            ("+CSS?", "+CSS: 1, A, 4120"),
        ]);
        queue.open("ttyUSB0", &PortSettings::default()).unwrap();

        let signal = queue.queue("ttyUSB0", "+CSQ", TIMEOUT);
        let serving = queue.queue("ttyUSB0", "+CSS?", TIMEOUT);

        assert!(matches!(signal.await, Err(TransportError::Timeout { .. })));
        assert_eq!(serving.await.unwrap(), "+CSS: 1, A, 4120");
    }

    #[tokio::test(start_paused = true)]
    async fn escape_answer_does_not_poison_the_cache() {
        let (queue, exchanges) = queue_with(&[("+GSN", "+GSN: 0x1234ABCD")]);
        queue.open("ttyUSB0", &PortSettings::default()).unwrap();

        queue
            .flash("ttyUSB0", Duration::from_millis(1000))
            .await
            .unwrap();

        for _ in 0..2 {
            let esn = queue.queue_cached("ttyUSB0", "+GSN", TIMEOUT).await.unwrap();
            assert_eq!(esn, "+GSN: 0x1234ABCD");
        }
        assert_eq!(exchanges.load(Ordering::SeqCst), 1);
    }
}
