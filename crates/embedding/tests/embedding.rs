use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use protocol::{MultiplexWriter, read_int, write_int};
use rsynk_embedding::{
    CommandFactory, ExitCode, Rsynk, RsynkError, RsynkFile, SshSettings, SshTransport, run_exec,
};

#[derive(Debug, Default)]
struct Calls {
    started: Vec<SshSettings>,
    stopped: usize,
}

#[derive(Clone, Default)]
struct RecordingTransport {
    calls: Arc<Mutex<Calls>>,
    refuse_start: bool,
    factory: Arc<Mutex<Option<Arc<CommandFactory>>>>,
}

impl SshTransport for RecordingTransport {
    fn start(&mut self, settings: &SshSettings, factory: Arc<CommandFactory>) -> io::Result<()> {
        if self.refuse_start {
            return Err(io::Error::new(io::ErrorKind::AddrInUse, "port taken"));
        }
        self.calls.lock().unwrap().started.push(settings.clone());
        *self.factory.lock().unwrap() = Some(factory);
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.calls.lock().unwrap().stopped += 1;
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn keyed() -> rsynk_embedding::RsynkBuilder {
    Rsynk::builder().server_keys(["/tmp/rsynk-test-key"])
}

/// Protocol version followed by an empty filter list.
fn handshake_only() -> Vec<u8> {
    let mut raw = Vec::new();
    write_int(&mut raw, 31).unwrap();
    let mut mux = MultiplexWriter::new(&mut raw);
    write_int(&mut mux, 0).unwrap();
    mux.flush().unwrap();
    drop(mux);
    raw
}

#[test]
fn builder_passes_settings_to_the_transport() {
    let transport = RecordingTransport::default();
    let calls = Arc::clone(&transport.calls);
    let server = keyed()
        .port(2222)
        .nio_workers(3)
        .command_workers(2)
        .idle_connection_timeout(Duration::from_secs(90))
        .max_auth_attempts(5)
        .build(transport.clone())
        .unwrap();

    let calls = calls.lock().unwrap();
    let settings = &calls.started[0];
    assert_eq!(settings.port, 2222);
    assert_eq!(settings.nio_workers, 3);
    assert_eq!(settings.command_workers, 2);
    assert_eq!(settings.idle_connection_timeout, Duration::from_secs(90));
    assert_eq!(settings.max_auth_attempts, 5);
    assert_eq!(settings.server_keys.len(), 1);
    assert_eq!(settings.application_name, "rsynk");
    assert_eq!(server.settings(), settings);
    assert_eq!(server.command_factory().pool().size(), 2);

    let handed = transport.factory.lock().unwrap().clone().unwrap();
    assert!(Arc::ptr_eq(&handed, &server.command_factory()));
}

#[test]
fn builder_requires_server_keys() {
    let error = Rsynk::builder()
        .build(RecordingTransport::default())
        .unwrap_err();
    assert!(matches!(error, RsynkError::MissingServerKeys));
}

#[test]
fn builder_rejects_zero_workers() {
    let error = keyed()
        .command_workers(0)
        .build(RecordingTransport::default())
        .unwrap_err();
    assert!(
        matches!(error, RsynkError::InvalidSetting { name: "command_workers", .. }),
        "{error}"
    );
}

#[test]
fn transport_start_failure_is_reported() {
    let transport = RecordingTransport {
        refuse_start: true,
        ..RecordingTransport::default()
    };
    let error = keyed().build(transport).unwrap_err();
    assert!(matches!(error, RsynkError::Transport(_)));
    assert!(error.to_string().contains("port taken"));
}

#[test]
fn close_stops_the_transport_once() {
    let transport = RecordingTransport::default();
    let calls = Arc::clone(&transport.calls);
    let mut server = keyed().build(transport).unwrap();

    server.close().unwrap();
    server.close().unwrap();
    drop(server);
    assert_eq!(calls.lock().unwrap().stopped, 1);
}

#[test]
fn drop_closes_the_transport() {
    let transport = RecordingTransport::default();
    let calls = Arc::clone(&transport.calls);
    drop(keyed().build(transport).unwrap());
    assert_eq!(calls.lock().unwrap().stopped, 1);
}

#[test]
fn tracking_updates_the_shared_registry() {
    let server = keyed().build(RecordingTransport::default()).unwrap();
    server
        .track_file(RsynkFile::new("a", "/srv/a"))
        .track_files([RsynkFile::new("b", "/srv/b"), RsynkFile::new("c", "/srv/c")]);
    assert_eq!(server.tracked_files().paths(), ["a", "b", "c"]);

    server.stop_tracking_all_files();
    assert!(server.tracked_files().is_empty());
}

#[test]
fn run_exec_rejects_foreign_commands() {
    let server = keyed().build(RecordingTransport::default()).unwrap();
    let stderr = SharedBuffer::default();
    let code = run_exec(
        &server.command_factory(),
        "sh -c id",
        io::empty(),
        io::sink(),
        stderr.clone(),
    );
    assert_eq!(code, ExitCode::StreamIo);
    assert_eq!(
        String::from_utf8(stderr.bytes()).unwrap(),
        "invalid arguments: sh -c id: not an rsync invocation: sh -c id\n"
    );
}

#[test]
fn run_exec_reports_untracked_files_after_the_handshake() {
    let server = keyed().build(RecordingTransport::default()).unwrap();
    let stdout = SharedBuffer::default();
    let stderr = SharedBuffer::default();

    let code = run_exec(
        &server.command_factory(),
        "rsync --server --sender -e.LsfxC . missing/file",
        Cursor::new(handshake_only()),
        stdout.clone(),
        stderr.clone(),
    );

    assert_eq!(code, ExitCode::FileSelect);
    let output = stdout.bytes();
    assert_eq!(read_int(&mut Cursor::new(&output[..4])).unwrap(), 31);
    assert_eq!(output[4], 30);
    assert_eq!(
        String::from_utf8(stderr.bytes()).unwrap(),
        "file is not tracked: missing/file\n"
    );
}

#[test]
fn run_exec_serves_an_empty_request() {
    let server = keyed().build(RecordingTransport::default()).unwrap();
    let code = run_exec(
        &server.command_factory(),
        "rsync --server --sender -LCd .",
        Cursor::new(handshake_only()),
        io::sink(),
        io::sink(),
    );
    assert_eq!(code, ExitCode::Ok);
}
