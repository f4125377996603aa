use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

/// The bytes of a trace, either memory mapped or read into memory
pub enum TraceBytes {
    #[cfg(unix)]
    Mapped(memmap2::Mmap),
    Buffered(Vec<u8>),
}

impl Deref for TraceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            #[cfg(unix)]
            TraceBytes::Mapped(m) => &m[..],
            TraceBytes::Buffered(v) => &v[..],
        }
    }
}

/// Opens a trace file. Reads are sequential, so on unix the file is memory mapped with that
/// advice given to the OS
pub fn open_trace(path: &Path) -> Result<TraceBytes, String> {
    let file = File::open(path).map_err(|e| format!("Couldn't open the trace file at path {}: {e}", path.display()))?;
    get_reader(file)
}

/// Reads a whole trace from standard input
pub fn read_stdin() -> Result<TraceBytes, String> {
    let mut buf = Vec::new();
    std::io::stdin().lock().read_to_end(&mut buf).map_err(|e| format!("Couldn't read the trace from stdin: {e}"))?;
    Ok(TraceBytes::Buffered(buf))
}

pub fn get_reader(file: File) -> Result<TraceBytes, String> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        const BUFFER_SIZE: usize = 4096 * 16;
        let mut buf = Vec::new();
        BufReader::with_capacity(BUFFER_SIZE, file).read_to_end(&mut buf).map_err(|e| format!("Couldn't read the trace file: {e}"))?;
        Ok(TraceBytes::Buffered(buf))
    }
    // Memory map the file on unix systems
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        let len = file.metadata().map_err(|e| format!("Couldn't read the trace file metadata: {e}"))?.len();
        // Mapping an empty file fails on some systems, and there's nothing to map anyway
        if len == 0 {
            return Ok(TraceBytes::Buffered(Vec::new()));
        }
        // The file is only read, and isn't expected to change during a simulation
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the file: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(TraceBytes::Mapped(m))
        }
    }
}
