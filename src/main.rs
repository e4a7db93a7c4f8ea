//! Terminal front end: draws the board at a fixed cadence and advances one
//! generation per frame until a key is pressed.
use std::io::{stdin, stdout, Stdout, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use termion::color;
use termion::input::TermRead;
use termion::raw::{IntoRawMode, RawTerminal};
use tracing::debug;

use toroidal_life::array_board::ArrayBoard;
use toroidal_life::grid::{BOARD_HEIGHT, BOARD_WIDTH};
use toroidal_life::types::{Board, BoardError};

const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Blocks on the keyboard and reports the first keypress, after which the
/// render loop winds down cooperatively.
fn input_loop(sender: mpsc::Sender<()>) {
    for key in stdin().keys() {
        if key.is_ok() {
            let _ = sender.send(());
            return;
        }
    }
}

fn draw_frame(screen: &mut RawTerminal<Stdout>, board: &ArrayBoard) -> Result<(), BoardError> {
    let cell_grid = board.snapshot()?;
    for y in 0..BOARD_HEIGHT {
        write!(screen, "{}", termion::cursor::Goto(1, y as u16 + 1)).expect("terminal write");
        for x in 0..BOARD_WIDTH {
            if cell_grid.get(x, y).is_live() {
                write!(screen, "{}  ", color::Bg(color::White)).expect("terminal write");
            } else {
                write!(screen, "{}  ", color::Bg(color::Black)).expect("terminal write");
            }
        }
    }
    write!(screen, "{}", color::Bg(color::Reset)).expect("terminal write");
    screen.flush().expect("terminal flush");
    Ok(())
}

fn main() -> Result<(), BoardError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos() as u64;
    debug!(seed, "seeding board");
    let mut board = ArrayBoard::new(seed);

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || input_loop(sender));

    let mut screen = stdout().into_raw_mode().expect("terminal raw mode");
    write!(screen, "{}{}", termion::clear::All, termion::cursor::Hide).expect("terminal write");

    // Shutdown is observed between frames only; an in-flight tick always
    // finishes first.
    while receiver.try_recv().is_err() {
        draw_frame(&mut screen, &board)?;
        thread::sleep(FRAME_INTERVAL);
        board.tick()?;
    }

    write!(
        screen,
        "{}{}{}",
        color::Bg(color::Reset),
        termion::clear::All,
        termion::cursor::Show
    )
    .expect("terminal write");
    board.release()
}
