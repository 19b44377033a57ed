use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

use md5::{Digest, Md5};
use protocol::{
    CHUNK_SIZE, CompatFlags, ItemFlags, MultiplexReader, MultiplexWriter, NDX_DONE, NdxState,
    ProtocolVersion, SERVER_COMPAT_FLAGS, SERVER_PROTOCOL_VERSION, SumHead,
    negotiate_protocol_version, read_byte, read_int, read_vstring, write_byte, write_int,
    write_varlong, write_vstring,
};
use tracing::{debug, info, warn};

use super::access::{FileAccess, StdFileAccess};
use super::command::Command;
use super::counting::{CountingReader, CountingWriter};
use super::error::CommandError;
use super::file_list::{self, ServedFile};
use crate::exit_code::ExitCode;
use crate::files::TrackedFiles;
use crate::interrupt::CancellationFlag;
use crate::request::{RequestData, RsyncOption};
use crate::timer::CommandExecutionTimer;

/// Longest filter rule accepted from the client.
const MAX_FILTER_RULE_LEN: i32 = 8 * 1024;

/// Phases of the send loop for protocol 29 and newer.
const MAX_PHASE: u32 = 2;

/// Serves `rsync --server --sender` requests from the tracked-file registry.
///
/// The sender always answers with whole literal data for the served range:
/// block checksums sent by the client are read and discarded, never matched.
pub struct RsyncServerSendCommand {
    files: Arc<TrackedFiles>,
    access: Arc<dyn FileAccess>,
}

impl RsyncServerSendCommand {
    /// Creates a sender reading through `std::fs`.
    pub fn new(files: Arc<TrackedFiles>) -> Self {
        Self::with_file_access(files, Arc::new(StdFileAccess))
    }

    /// Creates a sender reading through `access`.
    pub fn with_file_access(files: Arc<TrackedFiles>, access: Arc<dyn FileAccess>) -> Self {
        Self { files, access }
    }
}

impl fmt::Debug for RsyncServerSendCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsyncServerSendCommand")
            .field("tracked", &self.files.len())
            .finish_non_exhaustive()
    }
}

impl Command for RsyncServerSendCommand {
    fn name(&self) -> &'static str {
        "rsync-server-sender"
    }

    fn execute(
        &self,
        request: &RequestData,
        input: &mut dyn Read,
        output: &mut dyn Write,
        _error: &mut dyn Write,
        interrupt: &CancellationFlag,
    ) -> Result<(), CommandError> {
        reject_unsupported(request)?;

        let mut input = CountingReader::new(input);
        let mut output = CountingWriter::new(output);
        let protocol = setup_protocol(request, &mut input, &mut output)?;
        interrupt.check()?;

        let mut session = SenderSession {
            request,
            interrupt,
            access: self.access.as_ref(),
            reader: MultiplexReader::new(input),
            writer: MultiplexWriter::new(output),
            read_state: NdxState::new(),
            write_state: NdxState::new(),
        };
        session.run(&self.files, protocol)
    }
}

fn reject_unsupported(request: &RequestData) -> Result<(), CommandError> {
    match RsyncOption::UNSUPPORTED
        .into_iter()
        .find(|option| request.has(*option))
    {
        Some(option) => Err(CommandError::rsync(
            ExitCode::Unsupported,
            format!("option {option} is not supported by this server"),
        )),
        None => Ok(()),
    }
}

/// Version exchange, compat flags and checksum seed on the raw streams.
fn setup_protocol<R: Read, W: Write>(
    request: &RequestData,
    input: &mut R,
    output: &mut W,
) -> Result<ProtocolVersion, CommandError> {
    write_int(output, SERVER_PROTOCOL_VERSION.as_wire())?;
    output.flush()?;

    let advertised = read_int(input)?;
    let protocol = negotiate_protocol_version(advertised)?;

    if protocol.uses_compat_flags() {
        SERVER_COMPAT_FLAGS.write_to(output)?;
    }
    let seed = checksum_seed(request)?;
    write_int(output, seed)?;
    output.flush()?;

    let client_flags = request
        .protocol_token()
        .map(|token| CompatFlags::from_capability_letters(&token.capabilities))
        .unwrap_or_default();
    debug!(
        target: "rsynk::sender",
        advertised,
        %protocol,
        compat = %SERVER_COMPAT_FLAGS,
        client = %client_flags,
        "protocol negotiated"
    );
    Ok(protocol)
}

fn checksum_seed(request: &RequestData) -> Result<i32, CommandError> {
    if let Some(seed) = request.checksum_seed().filter(|seed| *seed != 0) {
        return Ok(seed);
    }
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes)
        .map_err(|err| CommandError::Other(format!("failed to generate checksum seed: {err}")))?;
    Ok(i32::from_le_bytes(bytes))
}

struct SenderSession<'a, R: Read, W: Write> {
    request: &'a RequestData,
    interrupt: &'a CancellationFlag,
    access: &'a dyn FileAccess,
    reader: MultiplexReader<CountingReader<R>>,
    writer: MultiplexWriter<CountingWriter<W>>,
    read_state: NdxState,
    write_state: NdxState,
}

/// The fields that follow a file index, echoed back verbatim.
struct ItemAttrs {
    ndx: i32,
    iflags: ItemFlags,
    basis: Option<u8>,
    xname: Option<Vec<u8>>,
}

impl<R: Read, W: Write> SenderSession<'_, R, W> {
    fn run(
        &mut self,
        tracked: &TrackedFiles,
        protocol: ProtocolVersion,
    ) -> Result<(), CommandError> {
        self.recv_filter_list()?;
        self.interrupt.check()?;

        let build_timer = CommandExecutionTimer::start();
        let files = file_list::build(self.request, tracked, self.access, self.interrupt)?;
        let flist_buildtime = build_timer.elapsed_millis();

        let xfer_timer = CommandExecutionTimer::start();
        file_list::send(&mut self.writer, &files, self.request)?;
        let flist_xfertime = xfer_timer.elapsed_millis();

        if files.is_empty() {
            info!(target: "rsynk::sender", "file list is empty, nothing to send");
            return Ok(());
        }
        let total_size: i64 = files.iter().map(|file| file.entry.size).sum();

        self.send_files(&files)?;
        self.report(total_size, flist_buildtime, flist_xfertime)?;
        self.read_final_goodbye(protocol)
    }

    fn recv_filter_list(&mut self) -> Result<(), CommandError> {
        loop {
            let len = read_int(&mut self.reader)?;
            if len == 0 {
                return Ok(());
            }
            if !(1..=MAX_FILTER_RULE_LEN).contains(&len) {
                return Err(CommandError::protocol(format!(
                    "invalid filter rule length {len}"
                )));
            }
            let mut rule = vec![0u8; len as usize];
            self.reader.read_exact(&mut rule)?;
            debug!(
                target: "rsynk::sender",
                rule = %String::from_utf8_lossy(&rule),
                "ignoring filter rule"
            );
        }
    }

    fn send_files(&mut self, files: &[ServedFile]) -> Result<(), CommandError> {
        let mut phase = 0;
        loop {
            self.interrupt.check()?;
            let ndx = self.read_state.read_ndx(&mut self.reader)?;
            if ndx == NDX_DONE {
                phase += 1;
                if phase > MAX_PHASE {
                    break;
                }
                debug!(target: "rsynk::sender", phase, "entering phase");
                self.write_state.write_ndx(&mut self.writer, NDX_DONE)?;
                self.writer.flush()?;
                continue;
            }

            let file = usize::try_from(ndx)
                .ok()
                .and_then(|index| files.get(index))
                .ok_or_else(|| CommandError::protocol(format!("invalid file index {ndx}")))?;
            let attrs = self.read_item_attrs(ndx)?;

            if !attrs.iflags.wants_transfer() {
                self.write_item_attrs(&attrs)?;
                continue;
            }

            let sum_head = SumHead::read_from(&mut self.reader)?;
            self.skip_block_sums(&sum_head)?;
            self.write_item_attrs(&attrs)?;
            sum_head.write_to(&mut self.writer)?;
            self.send_file_data(file)?;
        }

        self.write_state.write_ndx(&mut self.writer, NDX_DONE)?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_item_attrs(&mut self, ndx: i32) -> io::Result<ItemAttrs> {
        let iflags = ItemFlags::read_from(&mut self.reader)?;
        let basis = if iflags.contains(ItemFlags::BASIS_TYPE_FOLLOWS) {
            Some(read_byte(&mut self.reader)?)
        } else {
            None
        };
        let xname = if iflags.contains(ItemFlags::XNAME_FOLLOWS) {
            Some(read_vstring(&mut self.reader)?)
        } else {
            None
        };
        Ok(ItemAttrs {
            ndx,
            iflags,
            basis,
            xname,
        })
    }

    fn write_item_attrs(&mut self, attrs: &ItemAttrs) -> io::Result<()> {
        self.write_state.write_ndx(&mut self.writer, attrs.ndx)?;
        attrs.iflags.write_to(&mut self.writer)?;
        if let Some(basis) = attrs.basis {
            write_byte(&mut self.writer, basis)?;
        }
        if let Some(xname) = &attrs.xname {
            write_vstring(&mut self.writer, xname)?;
        }
        Ok(())
    }

    fn skip_block_sums(&mut self, head: &SumHead) -> io::Result<()> {
        let mut strong = [0u8; protocol::MAX_DIGEST_LEN as usize];
        let strong = &mut strong[..head.checksum_length as usize];
        for _ in 0..head.count {
            read_int(&mut self.reader)?;
            self.reader.read_exact(strong)?;
        }
        Ok(())
    }

    /// Sends the served range as literal tokens followed by its MD5.
    fn send_file_data(&mut self, file: &ServedFile) -> Result<(), CommandError> {
        let read_failed = |err: io::Error| {
            CommandError::rsync(
                ExitCode::FileIo,
                format!("failed to read {}: {err}", file.disk_path.display()),
            )
        };
        let mut source = self
            .access
            .open_at(&file.disk_path, file.range.offset())
            .map_err(read_failed)?
            .take(file.range.length());

        let mut hasher = Md5::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut sent = 0u64;
        loop {
            self.interrupt.check()?;
            let len = read_chunk(&mut source, &mut chunk).map_err(read_failed)?;
            if len == 0 {
                break;
            }
            write_int(&mut self.writer, len as i32)?;
            self.writer.write_all(&chunk[..len])?;
            hasher.update(&chunk[..len]);
            sent += len as u64;
        }
        write_int(&mut self.writer, 0)?;
        self.writer.write_all(&hasher.finalize())?;

        if sent < file.range.length() {
            warn!(
                target: "rsynk::sender",
                path = %file.disk_path.display(),
                expected = file.range.length(),
                sent,
                "file shrank while sending"
            );
        }
        debug!(target: "rsynk::sender", path = %file.disk_path.display(), sent, "file sent");
        Ok(())
    }

    fn report(
        &mut self,
        total_size: i64,
        flist_buildtime: u64,
        flist_xfertime: u64,
    ) -> Result<(), CommandError> {
        self.writer.flush()?;
        let total_read = self.reader.get_ref().count();
        let total_written = self.writer.get_ref().count();

        for value in [
            total_read as i64,
            total_written as i64,
            total_size,
            flist_buildtime as i64,
            flist_xfertime as i64,
        ] {
            write_varlong(&mut self.writer, value, 3)?;
        }
        self.writer.flush()?;

        info!(
            target: "rsynk::sender",
            total_read,
            total_written,
            total_size,
            "transfer finished"
        );
        Ok(())
    }

    fn read_final_goodbye(&mut self, protocol: ProtocolVersion) -> Result<(), CommandError> {
        self.expect_done()?;
        if protocol.has_extended_goodbye() {
            self.write_state.write_ndx(&mut self.writer, NDX_DONE)?;
            self.writer.flush()?;
            self.expect_done()?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn expect_done(&mut self) -> Result<(), CommandError> {
        match self.read_state.read_ndx(&mut self.reader)? {
            NDX_DONE => Ok(()),
            ndx => Err(CommandError::protocol(format!(
                "expected end of transfer, received index {ndx}"
            ))),
        }
    }
}

/// Fills `buf` unless the source ends first.
fn read_chunk<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
