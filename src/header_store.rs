use crate::block_header::BlockHeader;
use crate::config::PathProvider;
use crate::constants::chain::{CHUNK_SIZE, HEADER_SIZE};
use crate::constants::config::{QUIET, VERBOSE};
use crate::error::ChainError;
use crate::logger::log;
use crate::network::NetworkSource;
use std::fs;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStatus {
    Downloading,
    Completed,
    Failed,
    Cancelled,
}

struct BootstrapState {
    cancel: AtomicBool,
    status: Mutex<BootstrapStatus>,
}

/// Observable handle for a background store bootstrap. Completion is
/// polled, never joined; `cancel` aborts the download at the next
/// checkpoint and degrades to an empty store.
pub struct BootstrapHandle {
    state: Arc<BootstrapState>,
}

impl BootstrapHandle {
    fn with_status(status: BootstrapStatus) -> Self {
        Self {
            state: Arc::new(BootstrapState {
                cancel: AtomicBool::new(false),
                status: Mutex::new(status),
            }),
        }
    }

    pub fn status(&self) -> BootstrapStatus {
        self.state
            .status
            .lock()
            .map(|status| *status)
            .unwrap_or(BootstrapStatus::Failed)
    }

    pub fn downloading_headers(&self) -> bool {
        self.status() == BootstrapStatus::Downloading
    }

    pub fn cancel(&self) {
        self.state.cancel.store(true, Ordering::SeqCst);
    }
}

/// Dense flat file of 80-byte header records; the record for height h
/// occupies bytes [h*80, h*80+80). Every operation opens, seeks and closes
/// the file within the call. A single logical writer is assumed.
pub struct HeaderStore {
    paths: Box<dyn PathProvider>,
}

impl HeaderStore {
    pub fn new(paths: Box<dyn PathProvider>) -> Self {
        Self { paths }
    }

    fn path(&self) -> PathBuf {
        self.paths.headers_file_path()
    }

    /// Local chain height derived from the store file size, -1 when the
    /// store is empty or absent.
    pub fn height(&self) -> i64 {
        match fs::metadata(self.path()) {
            Ok(metadata) => metadata.len() as i64 / HEADER_SIZE as i64 - 1,
            Err(_) => -1,
        }
    }

    pub fn read_header(&self, height: i64) -> Result<Option<BlockHeader>, ChainError> {
        if height < 0 {
            return Ok(None);
        }
        let mut file = match File::open(self.path()) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.seek(SeekFrom::Start(height as u64 * HEADER_SIZE as u64))?;

        let mut raw = [0u8; HEADER_SIZE];
        match file.read_exact(&mut raw) {
            Ok(()) => Ok(Some(BlockHeader::from_bytes(&raw)?)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the 80-byte serialization at `height * 80`, overwriting any
    /// record already there.
    pub fn save_header(&self, header: &BlockHeader, height: i64) -> Result<(), ChainError> {
        if height < 0 {
            return Err(io::Error::new(ErrorKind::InvalidInput, "negative height").into());
        }
        let mut file = self.open_for_write()?;
        file.seek(SeekFrom::Start(height as u64 * HEADER_SIZE as u64))?;
        file.write_all(&header.serialize())?;
        Ok(())
    }

    /// Writes a raw chunk blob at `index * 2016 * 80`.
    pub fn save_chunk(&self, index: i64, data: &[u8]) -> Result<(), ChainError> {
        if index < 0 {
            return Err(io::Error::new(ErrorKind::InvalidInput, "negative chunk index").into());
        }
        let mut file = self.open_for_write()?;
        file.seek(SeekFrom::Start(index as u64 * CHUNK_SIZE as u64))?;
        file.write_all(data)?;
        Ok(())
    }

    fn open_for_write(&self) -> Result<File, io::Error> {
        let path = self.path();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
    }

    /// Bootstraps the store file in the background when it does not exist
    /// yet. Failure and cancellation both degrade to an empty file, so
    /// callers always end up with a readable (possibly height -1) store.
    /// The caller observes progress through the returned handle.
    pub fn init(&self, network: Arc<dyn NetworkSource>) -> BootstrapHandle {
        let path = self.path();
        if path.exists() {
            return BootstrapHandle::with_status(BootstrapStatus::Completed);
        }

        let state = Arc::new(BootstrapState {
            cancel: AtomicBool::new(false),
            status: Mutex::new(BootstrapStatus::Downloading),
        });
        let handle = BootstrapHandle {
            state: Arc::clone(&state),
        };

        thread::spawn(move || {
            let outcome = bootstrap_headers_file(&path, network.as_ref(), &state.cancel);
            if let Ok(mut status) = state.status.lock() {
                *status = outcome;
            }
        });
        handle
    }
}

fn bootstrap_headers_file(
    path: &Path,
    network: &dyn NetworkSource,
    cancel: &AtomicBool,
) -> BootstrapStatus {
    log("downloading initial headers file", VERBOSE);

    if cancel.load(Ordering::SeqCst) {
        create_empty_store(path);
        return BootstrapStatus::Cancelled;
    }

    let bytes = match network.fetch_bootstrap_file() {
        Ok(bytes) => bytes,
        Err(e) => {
            let failure = ChainError::BootstrapFailed(e.to_string());
            log(&format!("{}, creating empty store", failure), QUIET);
            create_empty_store(path);
            return BootstrapStatus::Failed;
        }
    };

    if cancel.load(Ordering::SeqCst) {
        create_empty_store(path);
        return BootstrapStatus::Cancelled;
    }

    match install_headers_file(path, &bytes) {
        Ok(()) => {
            let blocks = bytes.len() / HEADER_SIZE;
            log(&format!("done, {} blocks", blocks), VERBOSE);
            BootstrapStatus::Completed
        }
        Err(e) => {
            let failure = ChainError::BootstrapFailed(e.to_string());
            log(&format!("{}, creating empty store", failure), QUIET);
            create_empty_store(path);
            BootstrapStatus::Failed
        }
    }
}

// Write to a sibling tmp file first so a torn download never shows up as a
// valid store.
fn install_headers_file(path: &Path, bytes: &[u8]) -> Result<(), io::Error> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    let mut file = File::create(&tmp_path)?;
    file.write_all(bytes)?;
    fs::rename(&tmp_path, path)
}

fn create_empty_store(path: &Path) {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            let _ = fs::create_dir_all(dir);
        }
    }
    let _ = File::create(path);
}
