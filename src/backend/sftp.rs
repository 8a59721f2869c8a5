//! SFTP sessions via libssh2 (requires `sftp` feature).

use super::remote::{Connector, RemoteParams, RemoteSession};
use crate::error::{Error, Result};
use crate::utils::path::join_path;
use ssh2::{OpenFlags, OpenType, Session, Sftp};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::net::TcpStream;
use std::path::Path;

/// Permission bits for files created on the server.
const CREATE_MODE: i32 = 0o644;

/// Connects to SSH servers with password authentication and opens the SFTP
/// subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SftpConnector;

impl Connector for SftpConnector {
    fn connect(&self, params: &RemoteParams) -> Result<Box<dyn RemoteSession>> {
        let endpoint = params.endpoint();
        let failed = |stage: &str, e: &dyn std::fmt::Display| Error::Connection {
            address: endpoint.clone(),
            message: format!("{stage}: {e}"),
        };

        let tcp = TcpStream::connect(&endpoint).map_err(|e| failed("tcp connect", &e))?;
        let mut session = Session::new().map_err(|e| failed("session", &e))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| failed("handshake", &e))?;
        session
            .userauth_password(&params.username, &params.password)
            .map_err(|e| failed("authentication", &e))?;
        if !session.authenticated() {
            return Err(Error::Connection {
                address: endpoint.clone(),
                message: format!("authentication rejected for user {}", params.username),
            });
        }
        let sftp = session.sftp().map_err(|e| failed("sftp subsystem", &e))?;

        tracing::debug!(endpoint = %endpoint, "sftp session established");
        Ok(Box::new(SftpSession { session, sftp }))
    }
}

struct SftpSession {
    session: Session,
    sftp: Sftp,
}

impl RemoteSession for SftpSession {
    fn open_read(&self, path: &str) -> io::Result<Box<dyn Read>> {
        let file = self.sftp.open(Path::new(path))?;
        Ok(Box::new(file))
    }

    fn open_write(&self, path: &str, append: bool) -> io::Result<Box<dyn Write>> {
        let flags = if append {
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::APPEND
        } else {
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE
        };
        let mut file = self
            .sftp
            .open_mode(Path::new(path), flags, CREATE_MODE, OpenType::File)?;
        if append {
            // Not every server honours the append flag; position explicitly.
            file.seek(SeekFrom::End(0))?;
        }
        Ok(Box::new(file))
    }

    fn walk_files(&self, root: &str) -> io::Result<Vec<String>> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_owned()];

        while let Some(dir) = pending.pop() {
            for (entry, stat) in self.sftp.readdir(Path::new(&dir))? {
                let Some(name) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                    continue;
                };
                if name == "." || name == ".." {
                    continue;
                }
                let child = join_path(&dir, &name);
                if stat.is_dir() {
                    pending.push(child);
                } else if stat.is_file() {
                    files.push(child);
                }
            }
        }
        Ok(files)
    }

    fn close(&self) -> io::Result<()> {
        self.session
            .disconnect(None, "backup finished", None)
            .map_err(io::Error::from)
    }
}
