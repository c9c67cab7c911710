//! Scripted FTP server for end-to-end tests.
//!
//! Serves an in-memory tree on 127.0.0.1. Understands just enough of
//! RFC 959 for the client: USER/PASS, TYPE, PWD, PASV/EPSV/PORT, LIST,
//! RETR and QUIT. Everything else gets `502`. Selected files can be cut
//! off mid-transfer with a `426` reply.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};

pub const USER: &str = "test";
pub const PASSWORD: &str = "test";

#[derive(Debug, Clone, Default)]
pub struct RemoteFs {
    pub cwd: String,
    pub dirs: HashMap<String, Vec<String>>,
    pub files: HashMap<String, Vec<u8>>,
    /// Listed but refused by RETR with 550.
    pub forbidden: HashSet<String>,
    /// RETR sends this many bytes, drops the data socket and replies 426.
    pub aborted: HashMap<String, Abort>,
}

/// How the data socket goes away during an aborted RETR.
#[derive(Debug, Clone, Copy)]
pub struct Abort {
    pub after: usize,
    /// Close with RST instead of FIN, so the client sees a read error
    /// rather than an early end of data.
    pub reset: bool,
}

impl RemoteFs {
    pub fn new(cwd: &str) -> Self {
        Self {
            cwd: cwd.to_string(),
            ..Default::default()
        }
    }

    pub fn dir(mut self, path: &str, lines: &[String]) -> Self {
        self.dirs.insert(path.to_string(), lines.to_vec());
        self
    }

    pub fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }

    pub fn forbid(mut self, path: &str) -> Self {
        self.forbidden.insert(path.to_string());
        self
    }

    /// Close the data socket cleanly after `after` bytes, then reply 426.
    pub fn cut_off(mut self, path: &str, after: usize) -> Self {
        self.aborted.insert(path.to_string(), Abort { after, reset: false });
        self
    }

    /// Reset the data socket after `after` bytes, then reply 426.
    pub fn reset_after(mut self, path: &str, after: usize) -> Self {
        self.aborted.insert(path.to_string(), Abort { after, reset: true });
        self
    }
}

pub fn file_line(name: &str, size: usize) -> String {
    format!("-rw-r--r--   1 ftp ftp {:>8} Jan  1 12:00 {}", size, name)
}

pub fn dir_line(name: &str) -> String {
    format!("drwxr-xr-x   2 ftp ftp     4096 Jan  1 12:00 {}", name)
}

/// Start serving `fs`; every accepted control connection gets its own task.
pub async fn spawn_server(fs: RemoteFs) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let fs = Arc::new(fs);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let fs = Arc::clone(&fs);
            tokio::spawn(async move {
                let _ = serve(stream, fs).await;
            });
        }
    });
    addr
}

enum Data {
    None,
    Passive(TcpListener),
    Active(SocketAddr),
}

impl Data {
    async fn open(&mut self) -> io::Result<TcpStream> {
        match std::mem::replace(self, Data::None) {
            Data::Passive(listener) => listener.accept().await.map(|(s, _)| s),
            Data::Active(addr) => TcpStream::connect(addr).await,
            Data::None => Err(io::Error::new(io::ErrorKind::NotConnected, "no data channel")),
        }
    }
}

async fn reply(w: &mut OwnedWriteHalf, line: &str) -> io::Result<()> {
    w.write_all(line.as_bytes()).await?;
    w.write_all(b"\r\n").await
}

async fn send_data(w: &mut OwnedWriteHalf, data: &mut Data, body: &[u8]) -> io::Result<()> {
    if matches!(data, Data::None) {
        return reply(w, "425 Use PASV or PORT first").await;
    }
    reply(w, "150 Opening BINARY mode data connection").await?;
    let mut stream = data.open().await?;
    stream.write_all(body).await?;
    stream.shutdown().await?;
    drop(stream);
    reply(w, "226 Transfer complete").await
}

async fn send_aborted(
    w: &mut OwnedWriteHalf,
    data: &mut Data,
    body: &[u8],
    abort: Abort,
) -> io::Result<()> {
    reply(w, "150 Opening BINARY mode data connection").await?;
    let mut stream = data.open().await?;
    stream.write_all(&body[..abort.after.min(body.len())]).await?;
    stream.flush().await?;
    if abort.reset {
        #[allow(deprecated)]
        stream.set_linger(Some(Duration::ZERO))?;
    } else {
        stream.shutdown().await?;
    }
    drop(stream);
    reply(w, "426 Connection closed; transfer aborted").await
}

fn resolve(cwd: &str, arg: &str) -> String {
    if arg.is_empty() {
        cwd.to_string()
    } else if arg.starts_with('/') {
        arg.to_string()
    } else {
        format!("{}/{}", cwd.trim_end_matches('/'), arg)
    }
}

fn parse_port(arg: &str) -> Option<SocketAddr> {
    let nums: Vec<u8> = arg.split(',').map(|n| n.trim().parse().ok()).collect::<Option<_>>()?;
    if nums.len() != 6 {
        return None;
    }
    let port = u16::from(nums[4]) * 256 + u16::from(nums[5]);
    Some(SocketAddr::from(([nums[0], nums[1], nums[2], nums[3]], port)))
}

async fn serve(stream: TcpStream, fs: Arc<RemoteFs>) -> io::Result<()> {
    let (r, mut w) = stream.into_split();
    let mut lines = BufReader::new(r).lines();
    let mut data = Data::None;
    let mut logged_in = false;

    reply(&mut w, "220 fake ftp ready").await?;
    while let Some(line) = lines.next_line().await? {
        let (cmd, arg) = match line.split_once(' ') {
            Some((c, a)) => (c.to_ascii_uppercase(), a.to_string()),
            None => (line.to_ascii_uppercase(), String::new()),
        };
        if !logged_in && cmd != "USER" && cmd != "PASS" && cmd != "QUIT" {
            reply(&mut w, "530 Please login with USER and PASS").await?;
            continue;
        }

        match cmd.as_str() {
            "USER" => reply(&mut w, "331 Password required").await?,
            "PASS" if arg == PASSWORD => {
                logged_in = true;
                reply(&mut w, "230 Login successful").await?
            }
            "PASS" => reply(&mut w, "530 Login incorrect").await?,
            "TYPE" => reply(&mut w, "200 Switching to Binary mode").await?,
            "PWD" => {
                reply(&mut w, &format!("257 \"{}\" is the current directory", fs.cwd)).await?
            }
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await?;
                let port = listener.local_addr()?.port();
                data = Data::Passive(listener);
                reply(
                    &mut w,
                    &format!("227 Entering Passive Mode (127,0,0,1,{},{})", port / 256, port % 256),
                )
                .await?
            }
            "EPSV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await?;
                let port = listener.local_addr()?.port();
                data = Data::Passive(listener);
                reply(&mut w, &format!("229 Entering Extended Passive Mode (|||{}|)", port)).await?
            }
            "PORT" => match parse_port(&arg) {
                Some(addr) => {
                    data = Data::Active(addr);
                    reply(&mut w, "200 PORT command successful").await?
                }
                None => reply(&mut w, "501 Illegal PORT command").await?,
            },
            "LIST" => {
                let path = resolve(&fs.cwd, &arg);
                match fs.dirs.get(&path) {
                    Some(entries) => {
                        let mut body = format!("total {}\r\n", entries.len());
                        for entry in entries {
                            body.push_str(entry);
                            body.push_str("\r\n");
                        }
                        send_data(&mut w, &mut data, body.as_bytes()).await?
                    }
                    None => {
                        data = Data::None;
                        reply(&mut w, "550 Failed to open directory").await?
                    }
                }
            }
            "RETR" => {
                let path = resolve(&fs.cwd, &arg);
                if fs.forbidden.contains(&path) {
                    data = Data::None;
                    reply(&mut w, "550 Permission denied").await?
                } else if let (Some(content), Some(abort)) =
                    (fs.files.get(&path), fs.aborted.get(&path))
                {
                    send_aborted(&mut w, &mut data, content, *abort).await?
                } else if let Some(content) = fs.files.get(&path) {
                    send_data(&mut w, &mut data, content).await?
                } else {
                    data = Data::None;
                    reply(&mut w, "550 Failed to open file").await?
                }
            }
            "QUIT" => {
                reply(&mut w, "221 Goodbye").await?;
                break;
            }
            _ => reply(&mut w, "502 Command not implemented").await?,
        }
    }
    Ok(())
}
