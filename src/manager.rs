//! Manager state - central orchestrator for clients, windows and input.
//!
//! Every command is a method on [`ManagerState`]; the event loop feeds it
//! input bytes, pty events and FIFO lines, and the renderer reads it back.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use nix::sys::signal::Signal;
use ratatui::layout::Rect;

use crate::binding::{parse_keys, Keymap};
use crate::client::{Client, ClientId, Session, SpawnRequest, TermSize};
use crate::command::{parse_line, Action, Command};
use crate::config::ManagerConfig;
use crate::copy_mode::{helper_command, paste_payload, scratch_file, CopyKind, CopySession};
use crate::emulator::{Emulator, Notification};
use crate::error::{Error, Result};
use crate::layout::{Axis, LayoutKind, Placement, WindowId};
use crate::mode::{Dispatch, Mode, ModeState};
use crate::pty::{ProcessId, PtyEvent, PtyEventKind, Spawner};
use crate::view::{Direction, View};

/// Marker exported to children; its presence refuses nested instances.
pub const ENV_INSTANCE: &str = "TILEMUX";
/// Id of the window a child runs in.
pub const ENV_WINDOW_ID: &str = "TILEMUX_WINDOW_ID";
/// Absolute path of the command FIFO.
pub const ENV_CMD_FIFO: &str = "TILEMUX_CMD_FIFO";
/// Absolute path of the status FIFO.
pub const ENV_STATUS_FIFO: &str = "TILEMUX_STATUS_FIFO";

/// Argument of `create` asking for the focused client's directory.
const CWD_PLACEHOLDER: &str = "$CWD";

/// Pages scrolled by `scrollback` without an argument.
const DEFAULT_SCROLL_PAGES: f64 = -0.5;

/// All mutable state of a running manager.
pub struct ManagerState {
    config: ManagerConfig,
    keymap: Keymap,
    mode: ModeState,
    view: View,
    /// Live clients in creation order.
    clients: Vec<Client>,
    next_id: u32,
    spawner: Box<dyn Spawner>,
    register: Vec<u8>,
    screen: Rect,
    placements: Vec<Placement>,
    status: Option<String>,
    kill_signal: i32,
    startup: VecDeque<Action>,
    stop_requested: bool,
    needs_arrange: bool,
    needs_redraw: bool,
    bell: bool,
}

impl ManagerState {
    /// Create a manager drawing into `screen`.
    ///
    /// Nothing is spawned until [`ManagerState::run_startup`].
    #[must_use]
    pub fn new(
        config: ManagerConfig,
        keymap: Keymap,
        spawner: Box<dyn Spawner>,
        screen: Rect,
    ) -> Self {
        let mode = ModeState::new(&keymap);
        let startup = config.startup_actions().into();
        let status = config.status_fifo.as_ref().map(|_| String::new());
        Self {
            kill_signal: config.kill_signal,
            config,
            keymap,
            mode,
            view: View::new("main"),
            clients: Vec::new(),
            next_id: 1,
            spawner,
            register: Vec::new(),
            screen,
            placements: Vec::new(),
            status,
            startup,
            stop_requested: false,
            needs_arrange: true,
            needs_redraw: true,
            bell: false,
        }
    }

    /// Run the queued startup actions.
    pub fn run_startup(&mut self) {
        while let Some(action) = self.startup.pop_front() {
            self.run_action(&action, None);
        }
        if self.clients.is_empty() {
            tracing::info!("no client could be started");
            self.stop_requested = true;
        }
    }

    /// Whether the manager should exit.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Active input mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    /// Pending numeric prefix.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.mode.count()
    }

    /// Bytes typed toward the current command.
    #[must_use]
    pub fn entry(&self) -> &[u8] {
        self.mode.entry()
    }

    /// The key bindings.
    #[must_use]
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// The focus context.
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Live clients in creation order.
    #[must_use]
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Client with the given id.
    #[must_use]
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    fn client_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    /// Client shown in a window.
    #[must_use]
    pub fn client_in(&self, window: WindowId) -> Option<&Client> {
        self.view.tree.client(window).and_then(|id| self.client(id))
    }

    /// Client in the focused window.
    #[must_use]
    pub fn focused(&self) -> Option<&Client> {
        self.view.focus.and_then(|w| self.client_in(w))
    }

    fn focused_id(&self) -> Option<ClientId> {
        self.view.focus.and_then(|w| self.view.tree.client(w))
    }

    fn focused_mut(&mut self) -> Option<&mut Client> {
        let id = self.focused_id()?;
        self.client_mut(id)
    }

    /// Paste register.
    #[must_use]
    pub fn register(&self) -> &[u8] {
        &self.register
    }

    /// Signal sent by `killclient`.
    #[must_use]
    pub fn kill_signal(&self) -> i32 {
        self.kill_signal
    }

    /// Status bar text, `None` when no status bar is shown.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Replace the status bar text with the last non-empty line of `text`.
    pub fn set_status(&mut self, text: &str) {
        if let Some(line) = text.lines().rev().find(|l| !l.trim().is_empty()) {
            self.status = Some(line.trim_end().to_string());
        }
    }

    /// Title for the outer terminal.
    #[must_use]
    pub fn terminal_title(&self) -> Option<String> {
        self.config
            .title
            .clone()
            .or_else(|| self.focused().map(|c| c.display_title().to_string()))
    }

    /// Take the pending bell, if any client rang one.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Take the pending full-repaint request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Set the terminal area and reflow.
    pub fn set_screen(&mut self, screen: Rect) {
        if self.screen != screen {
            self.screen = screen;
            self.needs_arrange = true;
            self.needs_redraw = true;
        }
    }

    /// Full terminal area.
    #[must_use]
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Area handed to the layout tree, below the status bar if shown.
    #[must_use]
    pub fn layout_area(&self) -> Rect {
        let mut area = self.screen;
        if self.status.is_some() && area.height > 1 {
            area.y += 1;
            area.height -= 1;
        }
        area
    }

    /// Geometry computed by the last arrange pass.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Recompute geometry if needed and resize clients whose area changed.
    pub fn arrange(&mut self) {
        if !self.needs_arrange {
            return;
        }
        self.needs_arrange = false;
        self.placements = self.view.tree.arrange(self.layout_area());
        for placement in &self.placements {
            let Some(id) = self.view.tree.client(placement.window) else {
                continue;
            };
            if let Some(client) = self.clients.iter_mut().find(|c| c.id == id) {
                if let Err(e) = client.resize(TermSize::from(placement.content)) {
                    tracing::warn!(client = %id, "resize failed: {}", e);
                }
            }
        }
    }

    /// Feed one byte of terminal input.
    pub fn handle_input(&mut self, byte: u8) {
        match self.mode.feed(&self.keymap, byte) {
            Dispatch::Execute(action) => self.run_action(&action, Some(byte)),
            Dispatch::Pending => {}
            // A broken command sequence starts over at the command root.
            Dispatch::Unbound(keys) => {
                if self.mode.mode() == Mode::Keypress {
                    self.forward(&keys);
                }
            }
        }
    }

    /// Run one command FIFO line; unknown commands are ignored.
    pub fn handle_command_line(&mut self, line: &str) {
        if let Some(action) = parse_line(line) {
            tracing::debug!("fifo command: {}", action);
            self.run_action(&action, None);
        }
    }

    /// Execute an action and update the mode state after it.
    ///
    /// A failing command is logged and drops back to keypress mode.
    pub fn run_action(&mut self, action: &Action, trigger: Option<u8>) {
        if let Err(e) = self.execute(action, trigger) {
            tracing::warn!("{} failed: {}", action, e);
            self.set_mode(Mode::Keypress);
        }
        self.mode.finish(&self.keymap, action.command);
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode.set_mode(&self.keymap, mode);
    }

    /// Send bytes to the focused client, returning its view to the live screen.
    fn forward(&mut self, data: &[u8]) {
        if let Some(client) = self.focused_mut() {
            let id = client.id;
            client.active_mut().emulator.scroll(0);
            if let Err(e) = client.write(data) {
                tracing::debug!(client = %id, "dropped input: {}", e);
            }
        }
    }

    /// Dispatch one command.
    ///
    /// # Errors
    /// Returns the command's failure; state is left as it was before.
    pub fn execute(&mut self, action: &Action, trigger: Option<u8>) -> Result<()> {
        let count = self.mode.count();
        match action.command {
            Command::Create => self
                .create(action.arg(0), action.arg(1), action.arg(2))
                .map(|_| ()),
            Command::Split => {
                self.split(Axis::from_arg(action.arg(0)));
                Ok(())
            }
            Command::Mov => self.mov(Direction::from_arg(action.arg(0))?, count),
            Command::FocusN => self.focus_n(count),
            Command::FocusTransition => {
                self.focus_n(count)?;
                self.set_mode(Mode::Keypress);
                Ok(())
            }
            Command::Digit => {
                let digit = action
                    .arg(0)
                    .and_then(|a| a.parse::<u32>().ok())
                    .or_else(|| trigger.and_then(|b| char::from(b).to_digit(10)))
                    .ok_or_else(|| Error::InvalidArgument {
                        command: "digit",
                        value: action.arg(0).unwrap_or_default().to_string(),
                    })?;
                self.mode.push_digit(digit);
                Ok(())
            }
            Command::ChangeState => {
                let mode = Mode::from_arg(action.arg(0));
                self.set_mode(mode);
                if let (Mode::Keypress, Some(byte)) = (mode, trigger) {
                    self.forward(&[byte]);
                }
                Ok(())
            }
            Command::CopyMode => self.enter_copy_mode(action.arg(0), action.arg(1)),
            Command::Paste => self.paste(),
            Command::Quit => {
                tracing::info!("quit requested");
                self.stop_requested = true;
                Ok(())
            }
            Command::Redraw => {
                self.needs_redraw = true;
                self.needs_arrange = true;
                Ok(())
            }
            Command::Scrollback => self.scrollback(action.arg(0), count),
            Command::Send => {
                let data = action.args.concat();
                self.focused_mut()
                    .ok_or(Error::NoClient)?
                    .write(data.as_bytes())
            }
            Command::KillClient => {
                let signal = self.kill_signal;
                self.signal_client(self.selected(count)?, signal)
            }
            Command::SignalClient => {
                let signal = signal_number("signalclient", count)?;
                self.signal_client(self.selected(0)?, signal)
            }
            Command::ChangeKillSignal => {
                self.kill_signal = signal_number("change_kill_signal", count)?;
                tracing::info!(signal = self.kill_signal, "kill signal changed");
                Ok(())
            }
            Command::Bind => self.bind(&action.args),
        }
    }

    /// Client chosen by a count, or the focused one when the count is 0.
    fn selected(&self, count: u32) -> Result<ClientId> {
        if count == 0 {
            self.focused_id().ok_or(Error::NoClient)
        } else {
            let id = ClientId(count);
            self.client(id).map(|c| c.id).ok_or(Error::ClientNotFound(count))
        }
    }

    fn signal_client(&mut self, id: ClientId, signal: i32) -> Result<()> {
        let client = self.client_mut(id).ok_or(Error::ClientNotFound(id.0))?;
        tracing::debug!(client = %id, signal, "signalling");
        client.app.process.signal(signal)
    }

    /// Spawn a client running `cmd` (the shell when absent or empty).
    ///
    /// The client takes an empty window if there is one; otherwise the
    /// focused window is split along its layout's axis. A failed spawn
    /// leaves no client behind and does not use up an id.
    ///
    /// # Errors
    /// Returns an error if the process cannot be started.
    pub fn create(
        &mut self,
        cmd: Option<&str>,
        title: Option<&str>,
        cwd: Option<&str>,
    ) -> Result<ClientId> {
        let cmd = cmd.filter(|c| !c.is_empty());
        let window = match self.view.tree.find_empty(self.view.tree.root()) {
            Some(window) => window,
            None => {
                let target = self.split_target();
                let axis = match self.view.tree.kind(self.view.tree.enclosing(target)) {
                    LayoutKind::Row => Axis::Row,
                    LayoutKind::Column | LayoutKind::Undetermined => Axis::Column,
                };
                self.view.tree.split(target, axis)
            }
        };
        self.needs_arrange = true;

        let size = self
            .view
            .tree
            .arrange(self.layout_area())
            .into_iter()
            .find(|p| p.window == window)
            .map_or_else(|| TermSize::from(self.layout_area()), |p| TermSize::from(p.content))
            .clamped();

        let id = ClientId(self.next_id);
        let mut request = SpawnRequest::new(self.config.shell.clone(), size);
        request.env = self.child_env(id);
        if let Some(cmd) = cmd {
            request = request.command(cmd);
        }
        if let Some(dir) = self.resolve_cwd(cwd) {
            request = request.cwd(dir);
        }

        let process = self.spawner.spawn(&request)?;
        self.next_id += 1;

        let emulator = Emulator::new(size, self.config.scrollback_lines);
        let mut client = Client::new(id, cmd.unwrap_or_default(), Session::new(emulator, process));
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            title.clone_into(&mut client.title);
        }
        self.view.tree.attach(window, id)?;
        client.window = Some(window);
        tracing::info!(client = %id, pid = ?client.app.process.pid(), cmd = %client.cmd, "client created");
        self.clients.push(client);
        self.focus(window);
        Ok(id)
    }

    fn split_target(&self) -> WindowId {
        self.view
            .focus
            .or_else(|| self.view.tree.leaves().first().copied())
            .unwrap_or_else(|| self.view.tree.windows(self.view.tree.root())[0])
    }

    /// Split the focused window, leaving the new window empty.
    pub fn split(&mut self, axis: Axis) -> WindowId {
        let target = self.split_target();
        let window = self.view.tree.split(target, axis);
        self.needs_arrange = true;
        window
    }

    fn child_env(&self, id: ClientId) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(ENV_WINDOW_ID.to_string(), id.to_string());
        env.insert(ENV_INSTANCE.to_string(), env!("CARGO_PKG_VERSION").to_string());
        if std::env::var_os("ESCDELAY").is_none() {
            env.insert("ESCDELAY".to_string(), self.config.escape_delay.to_string());
        }
        for (key, path) in [
            (ENV_CMD_FIFO, &self.config.cmd_fifo),
            (ENV_STATUS_FIFO, &self.config.status_fifo),
        ] {
            if let Some(path) = path.as_ref().and_then(|p| std::path::absolute(p).ok()) {
                env.insert(key.to_string(), path.display().to_string());
            }
        }
        env
    }

    fn resolve_cwd(&self, cwd: Option<&str>) -> Option<PathBuf> {
        match cwd.filter(|c| !c.is_empty())? {
            CWD_PLACEHOLDER => {
                let pid = self.focused()?.app.process.pid()?;
                std::fs::read_link(format!("/proc/{pid}/cwd")).ok()
            }
            dir => Some(PathBuf::from(dir)),
        }
    }

    /// Focus a window and clear its client's urgent flag.
    pub fn focus(&mut self, window: WindowId) {
        self.view.focus = Some(window);
        if let Some(client) = self.focused_mut() {
            client.urgent = false;
        }
    }

    fn mov(&mut self, direction: Direction, count: u32) -> Result<()> {
        let from = self.view.focus.ok_or(Error::NoClient)?;
        if let Some(target) = self.view.neighbor(from, direction, count) {
            if self.view.tree.client(target).is_some() {
                self.focus(target);
            }
        }
        Ok(())
    }

    /// Focus the client numbered `count`, or the next one when 0.
    fn focus_n(&mut self, count: u32) -> Result<()> {
        let id = if count == 0 {
            self.next_client(self.focused_id()).ok_or(Error::NoClient)?
        } else {
            ClientId(count)
        };
        let window = self
            .client(id)
            .ok_or(Error::ClientNotFound(id.0))?
            .window
            .ok_or(Error::ClientNotFound(id.0))?;
        self.focus(window);
        Ok(())
    }

    /// Client after `current` in creation order, wrapping around.
    fn next_client(&self, current: Option<ClientId>) -> Option<ClientId> {
        let pos = current.and_then(|id| self.clients.iter().position(|c| c.id == id));
        let next = pos.map_or(0, |p| (p + 1) % self.clients.len().max(1));
        self.clients.get(next).map(|c| c.id)
    }

    fn scrollback(&mut self, pages: Option<&str>, count: u32) -> Result<()> {
        let pages = match pages {
            Some(p) => p.parse::<f64>().map_err(|_| Error::InvalidArgument {
                command: "scrollback",
                value: p.to_string(),
            })?,
            None => DEFAULT_SCROLL_PAGES,
        };
        let client = self.focused_mut().ok_or(Error::NoClient)?;
        let emulator = &mut client.active_mut().emulator;
        let rows = f64::from(emulator.size().rows);
        #[allow(clippy::cast_possible_truncation)]
        let lines = (-pages * rows * f64::from(count.max(1))).round() as isize;
        emulator.scroll(lines);
        Ok(())
    }

    fn paste(&mut self) -> Result<()> {
        let payload = paste_payload(&self.register).to_vec();
        if payload.is_empty() {
            return Ok(());
        }
        let client = self.focused_mut().ok_or(Error::NoClient)?;
        client.active_mut().emulator.scroll(0);
        client.write(&payload)
    }

    fn bind(&mut self, args: &[String]) -> Result<()> {
        let [keys, name, rest @ ..] = args else {
            return Err(Error::InvalidArgument {
                command: "bind",
                value: args.join(" "),
            });
        };
        let command = Command::from_name(name).ok_or_else(|| Error::UnknownCommand(name.clone()))?;
        let action = Action::with_args(command, rest.iter().map(String::as_str));
        self.keymap.bind(Mode::Keypress, &parse_keys(keys), action)?;
        tracing::info!("bound {} to {}", keys, name);
        Ok(())
    }

    /// Start copy mode on the focused client.
    ///
    /// `which` picks the helper; an `extra` of `bindings` shows the key
    /// bindings instead of the client's history, and `/` starts a search.
    ///
    /// # Errors
    /// Returns an error if there is no focused client, the scratch file
    /// cannot be written, or the helper cannot be started.
    pub fn enter_copy_mode(&mut self, which: Option<&str>, extra: Option<&str>) -> Result<()> {
        let kind = CopyKind::from_arg(which)?;
        let bindings = extra == Some("bindings");
        let keymap_text = bindings.then(|| self.keymap.describe());
        let program = kind.program(|var| std::env::var(var).ok());
        let id = self.focused_id().ok_or(Error::NoClient)?;
        let env = self.child_env(id);
        let shell = self.config.shell.clone();

        let client = self.client_mut(id).ok_or(Error::ClientNotFound(id.0))?;
        if client.in_copy_mode() {
            return Ok(());
        }
        let (content, line) = match keymap_text {
            Some(text) => (text.into_bytes(), 1),
            None => {
                let emulator = &mut client.app.emulator;
                (emulator.content(kind == CopyKind::Pager), emulator.content_start())
            }
        };
        let file = scratch_file(&content)?;
        let size = client.app.emulator.size();
        let mut request = SpawnRequest::new(shell, size)
            .command(helper_command(&program, line, &file.path().display().to_string()));
        request.env = env;

        let mut process = self.spawner.spawn(&request)?;
        if extra == Some("/") {
            process.write(b"/")?;
        }
        let client = self.client_mut(id).ok_or(Error::ClientNotFound(id.0))?;
        let title = format!("{}: {}", kind.label(), client.title);
        tracing::debug!(client = %id, program = %program, "copy mode started");
        client.editor = Some(CopySession {
            session: Session::new(Emulator::new(size, 0), process),
            file,
            capture: kind == CopyKind::Editor && !bindings,
            title,
        });
        self.set_mode(Mode::Keypress);
        Ok(())
    }

    /// Stop copy mode on a client, keeping what an editor saved.
    pub fn finish_copy_mode(&mut self, id: ClientId) {
        let Some(editor) = self.client_mut(id).and_then(|c| c.editor.take()) else {
            return;
        };
        match editor.finish() {
            Ok(Some(data)) => {
                tracing::debug!(client = %id, bytes = data.len(), "copied into register");
                self.register = data;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(client = %id, "reading copy buffer failed: {}", e),
        }
        self.needs_redraw = true;
    }

    /// Apply output or closure reported by a pty.
    pub fn handle_pty_event(&mut self, event: PtyEvent) {
        let focused = self.focused_id();
        let Some((client, editor)) = self.find_process(event.process) else {
            return;
        };
        let urgent_allowed = focused != Some(client.id);
        let mut rang = false;
        let session = if editor {
            match client.editor.as_mut() {
                Some(e) => &mut e.session,
                None => return,
            }
        } else {
            &mut client.app
        };

        match event.kind {
            PtyEventKind::Output(data) => {
                for note in session.emulator.process(&data) {
                    match note {
                        Notification::Title(title) if !editor && !title.is_empty() => {
                            client.title = title;
                        }
                        Notification::Title(_) => {}
                        Notification::Bell => {
                            if urgent_allowed {
                                client.urgent = true;
                            }
                            rang = true;
                        }
                    }
                }
            }
            PtyEventKind::Closed => {
                tracing::debug!(client = %client.id, editor, "pty closed");
                session.died = true;
            }
        }
        self.bell |= rang;
    }

    fn find_process(&mut self, process: ProcessId) -> Option<(&mut Client, bool)> {
        self.clients.iter_mut().find_map(|client| {
            if client.app.process.id() == process {
                Some((client, false))
            } else if client
                .editor
                .as_ref()
                .is_some_and(|e| e.session.process.id() == process)
            {
                Some((client, true))
            } else {
                None
            }
        })
    }

    /// Collect exit statuses after a child-exit signal.
    pub fn reap(&mut self) {
        for client in &mut self.clients {
            if client.app.process.try_reap() {
                client.app.died = true;
            }
            if let Some(editor) = client.editor.as_mut() {
                if editor.session.process.try_reap() {
                    editor.session.died = true;
                }
            }
        }
    }

    /// Tear down whatever died since the last sweep.
    ///
    /// A dead helper ends copy mode; a dead program without a helper
    /// destroys its client.
    pub fn sweep(&mut self) {
        let editors: Vec<ClientId> = self
            .clients
            .iter()
            .filter(|c| c.editor.as_ref().is_some_and(|e| e.session.died))
            .map(|c| c.id)
            .collect();
        for id in editors {
            self.finish_copy_mode(id);
        }

        let dead: Vec<ClientId> = self
            .clients
            .iter()
            .filter(|c| c.app.died && c.editor.is_none())
            .map(|c| c.id)
            .collect();
        for id in dead {
            self.destroy(id);
        }
    }

    /// Remove a client, keeping its window as an empty slot.
    pub fn destroy(&mut self, id: ClientId) {
        let Some(pos) = self.clients.iter().position(|c| c.id == id) else {
            return;
        };
        if self.focused_id() == Some(id) {
            let next = self
                .next_client(Some(id))
                .filter(|next| *next != id)
                .and_then(|next| self.client(next))
                .and_then(|c| c.window);
            self.view.focus = None;
            if let Some(window) = next {
                self.focus(window);
            }
        }

        let client = self.clients.remove(pos);
        if let Some(window) = client.window {
            self.view.tree.detach(window);
        }
        tracing::info!(client = %id, "client destroyed");
        drop(client);

        self.needs_arrange = true;
        self.needs_redraw = true;
        if self.clients.is_empty() && self.startup.is_empty() {
            tracing::info!("last client gone");
            self.stop_requested = true;
        }
    }
}

impl std::fmt::Debug for ManagerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerState")
            .field("mode", &self.mode.mode())
            .field("clients", &self.clients.len())
            .field("focus", &self.view.focus)
            .finish_non_exhaustive()
    }
}

fn signal_number(command: &'static str, count: u32) -> Result<i32> {
    i32::try_from(count)
        .ok()
        .and_then(|n| Signal::try_from(n).ok())
        .map(|s| s as i32)
        .ok_or_else(|| Error::InvalidArgument {
            command,
            value: count.to_string(),
        })
}
