//! Blocking client
//!
//! One request, one response, over a single TCP connection.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{Result, ZcacheError};
use crate::pool::PoolId;
use crate::protocol::{read_response, write_command, Command, Response, Status};

/// Client for the cache daemon
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a daemon
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a command and wait for its response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Create a pool, returning its id
    pub fn init_pool(&mut self, page_size: u32) -> Result<PoolId> {
        let response = self.checked(&Command::InitPool { page_size })?;
        response
            .text()
            .parse()
            .map_err(|_| ZcacheError::Protocol(format!("bad pool id: {:?}", response.text())))
    }

    /// Look up a page
    pub fn get_page(&mut self, pool: PoolId, inode: u64, offset: u64) -> Result<Option<Vec<u8>>> {
        let response = self.checked(&Command::GetPage { pool, inode, offset })?;
        match response.status {
            Status::NotFound => Ok(None),
            _ => Ok(Some(response.payload.unwrap_or_default())),
        }
    }

    /// Stash a page
    pub fn put_page(&mut self, pool: PoolId, inode: u64, offset: u64, data: &[u8]) -> Result<()> {
        self.checked(&Command::PutPage {
            pool,
            inode,
            offset,
            data: data.to_vec(),
        })?;
        Ok(())
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        self.checked(&Command::Ping)?;
        Ok(())
    }

    /// Send a command, turning an Error status into an error
    fn checked(&mut self, command: &Command) -> Result<Response> {
        let response = self.request(command)?;
        if response.status == Status::Error {
            return Err(ZcacheError::Network(response.text()));
        }
        Ok(response)
    }
}
