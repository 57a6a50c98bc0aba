//! zcache CLI Client
//!
//! Command-line interface for talking to a zcache daemon.

use clap::{Parser, Subcommand};
use zcache::network::Client;
use zcache::protocol::{Command, Status};

/// zcache CLI
#[derive(Parser, Debug)]
#[command(name = "zcache-cli")]
#[command(about = "CLI for the zcache page cache daemon")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7380")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a pool and print its id
    Init {
        /// Page size in bytes (0 = daemon default)
        #[arg(default_value = "0")]
        page_size: u32,
    },

    /// Fetch a page
    Get { pool: u32, inode: u64, offset: u64 },

    /// Store a page
    Put {
        pool: u32,
        inode: u64,
        offset: u64,

        /// Page contents
        data: String,
    },

    /// Drop one page
    FlushPage { pool: u32, inode: u64, offset: u64 },

    /// Drop every page of an inode
    FlushInode { pool: u32, inode: u64 },

    /// Destroy a pool
    FlushPool { pool: u32 },

    /// Read a control entry (e.g. pool0/memlimit)
    CtlRead { path: String },

    /// Write a control entry
    CtlWrite { path: String, value: String },

    /// List control entries
    CtlList,

    /// Ping the server
    Ping,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Init { page_size } => Command::InitPool { page_size },
            Commands::Get { pool, inode, offset } => Command::GetPage { pool, inode, offset },
            Commands::Put {
                pool,
                inode,
                offset,
                data,
            } => Command::PutPage {
                pool,
                inode,
                offset,
                data: data.into_bytes(),
            },
            Commands::FlushPage { pool, inode, offset } => {
                Command::FlushPage { pool, inode, offset }
            }
            Commands::FlushInode { pool, inode } => Command::FlushInode { pool, inode },
            Commands::FlushPool { pool } => Command::FlushPool { pool },
            Commands::CtlRead { path } => Command::ReadControl { path },
            Commands::CtlWrite { path, value } => Command::WriteControl { path, value },
            Commands::CtlList => Command::ListControl,
            Commands::Ping => Command::Ping,
        }
    }
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: cannot connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let response = match client.request(&args.command.into()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    match response.status {
        Status::Ok => {
            let text = response.text();
            if text.is_empty() {
                println!("OK");
            } else {
                println!("{}", text.trim_end());
            }
        }
        Status::NotFound => {
            println!("(not found)");
            std::process::exit(2);
        }
        Status::Error => {
            eprintln!("error: {}", response.text());
            std::process::exit(1);
        }
    }
}
