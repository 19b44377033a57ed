//! Lifecycle tests for exec commands driven through a `CommandFactory`.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use server::{
    AllCommandsResolver, CommandFactory, CommandState, ExecCommand, ExitCode,
    RsyncCommandsResolver, ServerConfig,
};
use transfer::files::TrackedFiles;
use transfer::request::RequestData;
use transfer::{CancellationFlag, Command, CommandError};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
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

enum Script {
    Succeed(Arc<AtomicUsize>),
    Fail(ExitCode),
    Io,
    Panic,
    Interrupted,
    UntilCancelled { started: Sender<()> },
    UntilReleased { started: Sender<()>, release: Receiver<()> },
}

struct Scripted(Script);

impl Command for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn execute(
        &self,
        _request: &RequestData,
        _input: &mut dyn Read,
        output: &mut dyn Write,
        _error: &mut dyn Write,
        interrupt: &CancellationFlag,
    ) -> Result<(), CommandError> {
        match &self.0 {
            Script::Succeed(runs) => {
                runs.fetch_add(1, Ordering::SeqCst);
                output.write_all(b"done")?;
                Ok(())
            }
            Script::Fail(code) => Err(CommandError::rsync(*code, "scripted failure")),
            Script::Io => Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed").into()),
            Script::Panic => panic!("boom"),
            Script::Interrupted => Err(CommandError::Interrupted),
            Script::UntilCancelled { started } => {
                started.send(()).unwrap();
                loop {
                    interrupt.check()?;
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
            Script::UntilReleased { started, release } => {
                started.send(()).unwrap();
                release.recv().unwrap();
                Ok(())
            }
        }
    }
}

fn factory_with(scripts: Vec<(&'static str, Script)>, workers: usize) -> CommandFactory {
    let mut family = RsyncCommandsResolver::empty();
    for (path, script) in scripts {
        family.register(
            Arc::new(Scripted(script)),
            Box::new(move |request: &RequestData| request.files() == [path]),
        );
    }
    let config = ServerConfig::default().with_command_workers(workers);
    CommandFactory::new(AllCommandsResolver::new(vec![Box::new(family)]), &config).unwrap()
}

type Exit = (ExitCode, Option<String>);

fn wire(command: &mut ExecCommand, output: &SharedBuffer, error: &SharedBuffer) -> Receiver<Exit> {
    let (tx, rx) = unbounded();
    command.set_input_stream(Box::new(io::empty()));
    command.set_output_stream(Box::new(output.clone()));
    command.set_error_stream(Box::new(error.clone()));
    command.set_exit_callback(Arc::new(move |code: ExitCode, message: Option<&str>| {
        tx.send((code, message.map(str::to_owned))).unwrap();
    }));
    rx
}

/// Blocks until every job queued before the call has finished.
fn drain(factory: &CommandFactory) {
    let workers = factory.pool().size();
    let barrier = Arc::new(Barrier::new(workers + 1));
    for _ in 0..workers {
        let barrier = Arc::clone(&barrier);
        factory
            .pool()
            .submit(move |_| {
                barrier.wait();
            })
            .unwrap();
    }
    barrier.wait();
}

#[test]
fn successful_command_reports_ok() {
    let runs = Arc::new(AtomicUsize::new(0));
    let factory = factory_with(vec![("ok", Script::Succeed(Arc::clone(&runs)))], 1);
    let (output, error) = (SharedBuffer::default(), SharedBuffer::default());

    let mut command = factory.create_command("rsync  --server --sender . ok");
    let exits = wire(&mut command, &output, &error);
    command.start();

    assert_eq!(exits.recv_timeout(WAIT).unwrap(), (ExitCode::Ok, None));
    assert_eq!(command.state(), CommandState::Completed);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(output.text(), "done");
    assert!(error.text().is_empty());
    assert!(exits.try_recv().is_err());
}

#[test]
fn missing_stream_reports_socket_io() {
    let factory = factory_with(vec![("ok", Script::Succeed(Arc::default()))], 1);
    let (tx, rx) = unbounded();
    let mut command = factory.create_command("rsync --server --sender . ok");
    command.set_input_stream(Box::new(io::empty()));
    command.set_output_stream(Box::new(io::sink()));
    command.set_exit_callback(Arc::new(move |code: ExitCode, _: Option<&str>| {
        tx.send(code).unwrap();
    }));
    command.start();

    assert_eq!(rx.try_recv().unwrap(), ExitCode::SocketIo);
    assert_eq!(command.state(), CommandState::Failed);
    assert!(factory.active_commands().is_empty());
}

#[test]
fn unknown_command_reports_stream_io_and_explains_on_stderr() {
    let factory = factory_with(vec![], 1);
    let (output, error) = (SharedBuffer::default(), SharedBuffer::default());
    let mut command = factory.create_command("rsync --server -logDtpr . dest");
    let exits = wire(&mut command, &output, &error);
    command.start();

    let (code, message) = exits.try_recv().unwrap();
    assert_eq!(code, ExitCode::StreamIo);
    assert_eq!(
        message.as_deref(),
        Some("command not found: rsync --server -logDtpr . dest")
    );
    assert_eq!(error.text(), "command not found: rsync --server -logDtpr . dest\n");
    assert!(output.text().is_empty());
    assert_eq!(command.state(), CommandState::Failed);
}

#[test]
fn invalid_arguments_report_stream_io_with_parser_cause() {
    let factory = factory_with(vec![("ok", Script::Succeed(Arc::default()))], 1);
    let (output, error) = (SharedBuffer::default(), SharedBuffer::default());
    let mut command = factory.create_command("rsync --server --sender --bogus . ok");
    let exits = wire(&mut command, &output, &error);
    command.start();

    let (code, _) = exits.try_recv().unwrap();
    assert_eq!(code, ExitCode::StreamIo);
    assert!(error.text().contains("unknown option --bogus"));
}

#[test]
fn rsync_failure_keeps_its_exit_code() {
    let factory = factory_with(vec![("bad", Script::Fail(ExitCode::FileSelect))], 1);
    let (output, error) = (SharedBuffer::default(), SharedBuffer::default());
    let mut command = factory.create_command("rsync --server --sender . bad");
    let exits = wire(&mut command, &output, &error);
    command.start();

    let (code, message) = exits.recv_timeout(WAIT).unwrap();
    assert_eq!(code, ExitCode::FileSelect);
    assert_eq!(message.as_deref(), Some("scripted failure"));
    assert_eq!(error.text(), "scripted failure\n");
    assert_eq!(command.state(), CommandState::Failed);
}

#[test]
fn io_failure_and_panic_map_to_stream_io() {
    let factory = factory_with(vec![("io", Script::Io), ("panic", Script::Panic)], 1);

    for (line, expected) in [
        ("rsync --server --sender . io", "I/O error: pipe closed"),
        ("rsync --server --sender . panic", "command panicked: boom"),
    ] {
        let (output, error) = (SharedBuffer::default(), SharedBuffer::default());
        let mut command = factory.create_command(line);
        let exits = wire(&mut command, &output, &error);
        command.start();

        let (code, message) = exits.recv_timeout(WAIT).unwrap();
        assert_eq!(code, ExitCode::StreamIo, "{line}");
        assert_eq!(message.as_deref(), Some(expected));
        assert_eq!(command.state(), CommandState::Failed);
    }
}

#[test]
fn pool_survives_a_panicking_command() {
    let runs = Arc::new(AtomicUsize::new(0));
    let factory = factory_with(
        vec![("panic", Script::Panic), ("ok", Script::Succeed(Arc::clone(&runs)))],
        1,
    );
    let sink = SharedBuffer::default();

    let mut first = factory.create_command("rsync --server --sender . panic");
    let first_exit = wire(&mut first, &sink, &sink);
    first.start();
    let mut second = factory.create_command("rsync --server --sender . ok");
    let second_exit = wire(&mut second, &sink, &sink);
    second.start();

    assert_eq!(first_exit.recv_timeout(WAIT).unwrap().0, ExitCode::StreamIo);
    assert_eq!(second_exit.recv_timeout(WAIT).unwrap().0, ExitCode::Ok);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn destroying_a_queued_command_skips_it() {
    let (started_tx, started_rx) = bounded(1);
    let (release_tx, release_rx) = bounded(1);
    let runs = Arc::new(AtomicUsize::new(0));
    let factory = factory_with(
        vec![
            (
                "busy",
                Script::UntilReleased {
                    started: started_tx,
                    release: release_rx,
                },
            ),
            ("queued", Script::Succeed(Arc::clone(&runs))),
        ],
        1,
    );
    let sink = SharedBuffer::default();

    let mut busy = factory.create_command("rsync --server --sender . busy");
    let busy_exit = wire(&mut busy, &sink, &sink);
    busy.start();
    started_rx.recv_timeout(WAIT).unwrap();

    let mut queued = factory.create_command("rsync --server --sender . queued");
    let queued_exit = wire(&mut queued, &sink, &sink);
    queued.start();
    assert_eq!(queued.state(), CommandState::Started);
    assert_eq!(factory.active_commands().len(), 2);

    queued.destroy();
    assert_eq!(queued.state(), CommandState::Destroyed);

    release_tx.send(()).unwrap();
    assert_eq!(busy_exit.recv_timeout(WAIT).unwrap().0, ExitCode::Ok);
    drain(&factory);

    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(queued_exit.try_recv().is_err());
    assert!(factory.active_commands().is_empty());
}

#[test]
fn destroying_a_running_command_interrupts_without_report() {
    let (started_tx, started_rx) = bounded(1);
    let factory = factory_with(
        vec![("spin", Script::UntilCancelled { started: started_tx })],
        1,
    );
    let sink = SharedBuffer::default();

    let mut command = factory.create_command("rsync --server --sender . spin");
    let exits = wire(&mut command, &sink, &sink);
    command.start();
    started_rx.recv_timeout(WAIT).unwrap();
    assert_eq!(command.state(), CommandState::Running);
    assert_eq!(
        factory.active_commands(),
        vec![(command.invocation_id(), "rsync --server --sender . spin".to_owned())]
    );

    command.handle().destroy();
    drain(&factory);

    assert_eq!(command.state(), CommandState::Destroyed);
    assert!(exits.try_recv().is_err());
    assert!(factory.active_commands().is_empty());
}

#[test]
fn interruption_without_destroy_still_reports() {
    let factory = factory_with(vec![("stray", Script::Interrupted)], 1);
    let (output, error) = (SharedBuffer::default(), SharedBuffer::default());
    let mut command = factory.create_command("rsync --server --sender . stray");
    let exits = wire(&mut command, &output, &error);
    command.start();

    let (code, message) = exits.recv_timeout(WAIT).unwrap();
    assert_eq!(code, ExitCode::StreamIo);
    assert_eq!(message.as_deref(), Some("command interrupted"));
    assert_eq!(error.text(), "command interrupted\n");
    assert_eq!(command.state(), CommandState::Failed);
    assert!(factory.active_commands().is_empty());
}

#[test]
fn destroy_after_completion_is_ignored() {
    let factory = factory_with(vec![("ok", Script::Succeed(Arc::default()))], 1);
    let sink = SharedBuffer::default();
    let mut command = factory.create_command("rsync --server --sender . ok");
    let exits = wire(&mut command, &sink, &sink);
    command.start();
    assert_eq!(exits.recv_timeout(WAIT).unwrap().0, ExitCode::Ok);

    command.destroy();
    command.start();
    assert_eq!(command.state(), CommandState::Completed);
    assert!(exits.try_recv().is_err());
}

#[test]
fn destroy_before_start_prevents_running() {
    let runs = Arc::new(AtomicUsize::new(0));
    let factory = factory_with(vec![("ok", Script::Succeed(Arc::clone(&runs)))], 1);
    let sink = SharedBuffer::default();
    let mut command = factory.create_command("rsync --server --sender . ok");
    let exits = wire(&mut command, &sink, &sink);

    command.destroy();
    command.start();
    drain(&factory);

    assert_eq!(command.state(), CommandState::Destroyed);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(exits.try_recv().is_err());
}

#[test]
fn sender_refuses_unsupported_options() {
    let factory =
        CommandFactory::for_tracked_files(Arc::new(TrackedFiles::new()), &ServerConfig::default())
            .unwrap();
    let (output, error) = (SharedBuffer::default(), SharedBuffer::default());
    let mut command = factory.create_command("rsync --server --sender -z . some/file");
    let exits = wire(&mut command, &output, &error);
    command.start();

    let (code, _) = exits.recv_timeout(WAIT).unwrap();
    assert_eq!(code, ExitCode::Unsupported);
    assert!(output.text().is_empty());
    assert!(error.text().contains("not supported"));
}
