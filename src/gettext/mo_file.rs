//! Gettext MO binary catalog codec.
//!
//! Layout (all integers are 32-bit in the file's byte order):
//!
//! ```text
//! 0   magic            DE 12 04 95 (little-endian) / 95 04 12 DE (big-endian)
//! 4   revision         always 0
//! 8   entry count N
//! 12  source table offset
//! 16  target table offset
//! 20  hash table size  written as 0
//! 24  hash table offset
//! ..  N x (length, offset) source descriptors, then N target descriptors
//! ..  NUL-terminated source strings, then NUL-terminated target strings
//! ```

use super::catalog::{split_key, MessageCatalog};
use super::CatalogError;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: u32 = 28;

/// Size of one (length, offset) descriptor in bytes.
const DESCRIPTOR_SIZE: u32 = 8;

const LITTLE_ENDIAN_MAGIC: [u8; 4] = [0xde, 0x12, 0x04, 0x95];
const BIG_ENDIAN_MAGIC: [u8; 4] = [0x95, 0x04, 0x12, 0xde];

/// Byte order of the 32-bit integers in an MO file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Detect the byte order from the first four bytes of a file.
    pub fn from_magic(magic: [u8; 4]) -> Result<Self, CatalogError> {
        match magic {
            LITTLE_ENDIAN_MAGIC => Ok(Endianness::Little),
            BIG_ENDIAN_MAGIC => Ok(Endianness::Big),
            other => Err(CatalogError::BadMagic(u32::from_le_bytes(other))),
        }
    }

    /// The magic bytes announcing this byte order.
    pub fn magic(self) -> [u8; 4] {
        match self {
            Endianness::Little => LITTLE_ENDIAN_MAGIC,
            Endianness::Big => BIG_ENDIAN_MAGIC,
        }
    }

    fn read_u32<R: Read>(self, reader: &mut R) -> io::Result<u32> {
        match self {
            Endianness::Little => reader.read_u32::<LittleEndian>(),
            Endianness::Big => reader.read_u32::<BigEndian>(),
        }
    }

    fn write_u32<W: Write>(self, writer: &mut W, value: u32) -> io::Result<()> {
        match self {
            Endianness::Little => writer.write_u32::<LittleEndian>(value),
            Endianness::Big => writer.write_u32::<BigEndian>(value),
        }
    }
}

/// Fixed-layout metadata at the start of an MO file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogHeader {
    pub endianness: Endianness,
    pub revision: u32,
    pub count: u32,
    pub source_table_offset: u32,
    pub target_table_offset: u32,
    pub hash_table_size: u32,
    pub hash_table_offset: u32,
}

/// Location of one string inside the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringDescriptor {
    pub length: u32,
    pub offset: u32,
}

impl StringDescriptor {
    /// First byte past the string (the NUL terminator is not counted).
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.length)
    }
}

/// Read and validate the header, leaving the reader positioned after it.
pub fn read_header<R: Read>(reader: &mut R) -> Result<CatalogHeader, CatalogError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(truncated("magic"))?;
    let endianness = Endianness::from_magic(magic)?;

    let revision = endianness.read_u32(reader).map_err(truncated("header"))?;
    if revision != 0 {
        return Err(CatalogError::UnsupportedRevision(revision));
    }

    let mut fields = [0u32; 5];
    for field in fields.iter_mut() {
        *field = endianness.read_u32(reader).map_err(truncated("header"))?;
    }
    let [count, source_table_offset, target_table_offset, hash_table_size, hash_table_offset] =
        fields;

    Ok(CatalogHeader {
        endianness,
        revision,
        count,
        source_table_offset,
        target_table_offset,
        hash_table_size,
        hash_table_offset,
    })
}

/// Read the translations belonging to `context` (`""` for unqualified keys).
///
/// Returned keys have their context prefix stripped.
pub fn read_messages<R: Read + Seek>(
    reader: &mut R,
    context: &str,
) -> Result<HashMap<String, String>, CatalogError> {
    let mut mo = MoReader::new(reader)?;
    let (sources, targets) = mo.descriptor_tables()?;

    let mut messages = HashMap::new();
    for (source, target) in sources.iter().zip(&targets) {
        let raw = mo.read_string(source)?;
        let (embedded, key) = split_key(&raw);
        if embedded.unwrap_or("") != context {
            continue;
        }
        let value = mo.read_string(target)?;
        messages.insert(key.to_string(), value);
    }
    Ok(messages)
}

/// Read every entry, keeping context-qualified raw keys.
pub fn read_catalog<R: Read + Seek>(reader: &mut R) -> Result<MessageCatalog, CatalogError> {
    let mut mo = MoReader::new(reader)?;
    let (sources, targets) = mo.descriptor_tables()?;

    let mut catalog = MessageCatalog::new();
    for (source, target) in sources.iter().zip(&targets) {
        let key = mo.read_string(source)?;
        let value = mo.read_string(target)?;
        catalog.insert(key, value);
    }
    Ok(catalog)
}

/// Serialize `catalog` in MO layout.
pub fn write_catalog<W: Write>(
    writer: &mut W,
    catalog: &MessageCatalog,
    endianness: Endianness,
) -> Result<(), CatalogError> {
    let layout = Layout::compute(catalog, endianness)?;
    let header = &layout.header;

    writer.write_all(&endianness.magic())?;
    for value in [
        header.revision,
        header.count,
        header.source_table_offset,
        header.target_table_offset,
        header.hash_table_size,
        header.hash_table_offset,
    ] {
        endianness.write_u32(writer, value)?;
    }

    for descriptor in layout.sources.iter().chain(&layout.targets) {
        endianness.write_u32(writer, descriptor.length)?;
        endianness.write_u32(writer, descriptor.offset)?;
    }

    for (key, _) in catalog.iter() {
        write_terminated(writer, key)?;
    }
    for (_, value) in catalog.iter() {
        write_terminated(writer, value)?;
    }
    Ok(())
}

/// File-level access to MO catalogs with advisory locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoFile {
    endianness: Endianness,
}

impl MoFile {
    /// Create a codec that writes files in the given byte order.
    ///
    /// Reading always detects the byte order from the file itself.
    pub fn new(endianness: Endianness) -> Self {
        Self { endianness }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Load the translations of one context under a shared lock.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        context: &str,
    ) -> Result<HashMap<String, String>, CatalogError> {
        let path = path.as_ref();
        let file = open(path)?;
        let _lock = FileLock::shared(&file, path)?;

        let messages = read_messages(&mut BufReader::new(&file), context)?;
        debug!(
            "Loaded {} messages for context '{}' from {}",
            messages.len(),
            context,
            path.display()
        );
        Ok(messages)
    }

    /// Load the whole catalog under a shared lock.
    pub fn load_catalog(&self, path: impl AsRef<Path>) -> Result<MessageCatalog, CatalogError> {
        let path = path.as_ref();
        let file = open(path)?;
        let _lock = FileLock::shared(&file, path)?;

        let catalog = read_catalog(&mut BufReader::new(&file))?;
        debug!("Loaded {} entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Write `catalog` to `path` under an exclusive lock.
    ///
    /// The file is only truncated once the lock is held; a failure part-way
    /// leaves it corrupt. Callers needing atomic replacement should write to
    /// a temporary file and rename it.
    pub fn save(&self, path: impl AsRef<Path>, catalog: &MessageCatalog) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| CatalogError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let _lock = FileLock::exclusive(&file, path)?;
        file.set_len(0)?;

        let mut writer = BufWriter::new(&file);
        write_catalog(&mut writer, catalog, self.endianness)?;
        writer.flush()?;
        debug!(
            "Wrote {} entries ({:?} endian) to {}",
            catalog.len(),
            self.endianness,
            path.display()
        );
        Ok(())
    }
}

/// Cursor over an MO file whose header has been validated.
struct MoReader<'a, R> {
    reader: &'a mut R,
    header: CatalogHeader,
    file_len: u64,
}

impl<'a, R: Read + Seek> MoReader<'a, R> {
    fn new(reader: &'a mut R) -> Result<Self, CatalogError> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        let header = read_header(reader)?;
        Ok(Self {
            reader,
            header,
            file_len,
        })
    }

    fn descriptor_tables(
        &mut self,
    ) -> Result<(Vec<StringDescriptor>, Vec<StringDescriptor>), CatalogError> {
        let sources = self.read_table(self.header.source_table_offset, "source")?;
        let targets = self.read_table(self.header.target_table_offset, "target")?;
        Ok((sources, targets))
    }

    fn read_table(
        &mut self,
        offset: u32,
        name: &str,
    ) -> Result<Vec<StringDescriptor>, CatalogError> {
        let count = self.header.count;
        let table_end = u64::from(offset) + u64::from(count) * u64::from(DESCRIPTOR_SIZE);
        if table_end > self.file_len {
            return Err(CatalogError::Malformed(format!(
                "{name} table at offset {offset} with {count} entries exceeds file size {}",
                self.file_len
            )));
        }

        self.reader.seek(SeekFrom::Start(u64::from(offset)))?;
        let order = self.header.endianness;
        (0..count)
            .map(|_| {
                let length = order.read_u32(self.reader)?;
                let offset = order.read_u32(self.reader)?;
                Ok::<_, CatalogError>(StringDescriptor { length, offset })
            })
            .collect()
    }

    fn read_string(&mut self, descriptor: &StringDescriptor) -> Result<String, CatalogError> {
        if descriptor.end() > self.file_len {
            return Err(CatalogError::Malformed(format!(
                "string at offset {} with length {} exceeds file size {}",
                descriptor.offset, descriptor.length, self.file_len
            )));
        }

        self.reader
            .seek(SeekFrom::Start(u64::from(descriptor.offset)))?;
        let mut bytes = vec![0u8; descriptor.length as usize];
        self.reader.read_exact(&mut bytes)?;
        String::from_utf8(bytes).map_err(|_| CatalogError::InvalidUtf8 {
            offset: descriptor.offset,
        })
    }
}

/// Header and descriptor tables for a catalog about to be written.
struct Layout {
    header: CatalogHeader,
    sources: Vec<StringDescriptor>,
    targets: Vec<StringDescriptor>,
}

impl Layout {
    fn compute(catalog: &MessageCatalog, endianness: Endianness) -> Result<Self, CatalogError> {
        let too_large = || CatalogError::Malformed("catalog exceeds the 4 GiB MO limit".to_string());

        let count = u32::try_from(catalog.len()).map_err(|_| too_large())?;
        let table_size = count.checked_mul(DESCRIPTOR_SIZE).ok_or_else(too_large)?;
        let source_table_offset = HEADER_SIZE;
        let target_table_offset = source_table_offset
            .checked_add(table_size)
            .ok_or_else(too_large)?;
        let strings_offset = target_table_offset
            .checked_add(table_size)
            .ok_or_else(too_large)?;

        let mut offset = strings_offset;
        let mut place = |text: &str| -> Result<StringDescriptor, CatalogError> {
            let length = u32::try_from(text.len()).map_err(|_| too_large())?;
            let descriptor = StringDescriptor { length, offset };
            offset = offset
                .checked_add(length)
                .and_then(|end| end.checked_add(1))
                .ok_or_else(too_large)?;
            Ok(descriptor)
        };

        let sources = catalog
            .iter()
            .map(|(key, _)| place(key))
            .collect::<Result<Vec<_>, _>>()?;
        let targets = catalog
            .iter()
            .map(|(_, value)| place(value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            header: CatalogHeader {
                endianness,
                revision: 0,
                count,
                source_table_offset,
                target_table_offset,
                hash_table_size: 0,
                hash_table_offset: strings_offset,
            },
            sources,
            targets,
        })
    }
}

/// Holds an advisory lock on a file until dropped.
struct FileLock<'a> {
    file: &'a File,
}

impl<'a> FileLock<'a> {
    fn shared(file: &'a File, path: &Path) -> Result<Self, CatalogError> {
        file.lock_shared().map_err(|source| CatalogError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }

    fn exclusive(file: &'a File, path: &Path) -> Result<Self, CatalogError> {
        file.lock().map_err(|source| CatalogError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }
}

impl Drop for FileLock<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!("Failed to release catalog lock: {}", e);
        }
    }
}

fn open(path: &Path) -> Result<File, CatalogError> {
    File::open(path).map_err(|source| CatalogError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn write_terminated<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.write_all(&[0])
}

fn truncated(what: &'static str) -> impl Fn(io::Error) -> CatalogError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            CatalogError::Malformed(format!("file truncated inside the {what}"))
        } else {
            CatalogError::Io(e)
        }
    }
}
