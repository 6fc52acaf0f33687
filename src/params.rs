//! Silent-install parameter resolution
//!
//! Maps an installer file name to the command-line arguments that force an
//! unattended install for that installer family. Matching is a lowercased
//! substring scan over an ordered keyword table; the first matching keyword
//! wins, so table order is the priority tie-break. Unknown installers get a
//! maximally silent default set.

use std::path::Path;

/// Ordered (keyword, arguments) table. Earlier entries win on overlap, so
/// e.g. "rar" outranks the 7-Zip keywords for names carrying both tokens.
const SILENT_PARAM_TABLE: &[(&str, &[&str])] = &[
    // Browsers
    ("chrome", &["--silent", "--install", "--force", "--do-not-launch-chrome"]),
    ("googlechrome", &["--silent", "--install", "--force", "--do-not-launch-chrome"]),
    ("firefox", &["-ms", "-ma"]),
    ("brave", &["--silent", "--install", "--do-not-launch-brave"]),
    ("opera", &["/silent", "/install", "/launchopera=0"]),
    // Adobe suite
    ("adobereader", &["/sAll", "/rs", "/rps", "/msi", "/quiet", "/norestart", "/suppressmsg"]),
    ("acrord", &["/sAll", "/rs", "/rps", "/msi", "/quiet", "/norestart", "/suppressmsg"]),
    ("acrobat", &["/sAll", "/rs", "/rps", "/msi", "/quiet", "/norestart", "/suppressmsg"]),
    // Archivers
    ("winrar", &["/S", "/D=C:\\Program Files\\WinRAR"]),
    ("rar", &["/S", "/D=C:\\Program Files\\WinRAR"]),
    ("7z", &["/S", "/D=C:\\Program Files\\7-Zip"]),
    ("7zip", &["/S", "/D=C:\\Program Files\\7-Zip"]),
    // Media
    ("vlc", &["/S", "/quiet", "/norestart", "/no-run"]),
    ("codec", &["/S", "/quick", "/silent"]),
    // Utilities
    ("notepad++", &["/S", "/D=C:\\Program Files\\Notepad++"]),
    ("python", &["/quiet", "InstallAllUsers=1", "PrependPath=1", "Include_test=0", "AssociateFiles=0", "Shortcuts=0"]),
    ("java", &["INSTALL_SILENT=1", "STATIC=0", "WEB_JAVA=0", "WEB_JAVA_SECURITY_LEVEL=H", "AUTO_UPDATE=0"]),
    // Communication
    ("zoom", &["/quiet", "/norestart", "/nogoogle"]),
    ("teams", &["-s", "--disable-auto-start"]),
    ("discord", &["--silent", "--do-not-run"]),
    // Office
    ("office", &["/quiet", "/norestart", "/config", "config.xml"]),
    ("365", &["/quiet", "/norestart", "/config", "config.xml"]),
    // In-house Inno Setup packages
    ("polichequeos", &["/VERYSILENT", "/SUPPRESSMSGBOXES", "/NORESTART", "/SP-"]),
    ("biocom", &["/VERYSILENT", "/SUPPRESSMSGBOXES", "/NORESTART", "/SP-"]),
    ("tablero", &["/VERYSILENT", "/SUPPRESSMSGBOXES", "/NORESTART", "/SP-"]),
    ("ergo", &["/VERYSILENT", "/SUPPRESSMSGBOXES", "/NORESTART", "/SP-"]),
    ("trii", &["/VERYSILENT", "/SUPPRESSMSGBOXES", "/NORESTART", "/SP-"]),
    ("vnc", &["/VERYSILENT", "/SUPPRESSMSGBOXES", "/NORESTART", "/SP-"]),
    ("openvpn", &["/VERYSILENT", "/SUPPRESSMSGBOXES", "/NORESTART", "/SP-"]),
];

/// Fallback for installers that match no keyword: suppress every dialog,
/// forbid cancellation, force app closure/restart, install for all users,
/// keep a log.
const DEFAULT_SILENT_ARGS: &[&str] = &[
    "/VERYSILENT",
    "/SUPPRESSMSGBOXES",
    "/NORESTART",
    "/SP-",
    "/NOCANCEL",
    "/CLOSEAPPLICATIONS",
    "/RESTARTAPPLICATIONS",
    "/LOG",
    "/ALLUSERS",
];

/// Default wall-clock limit for a silent install, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Resolve the full silent-install command line for an installer path.
///
/// The returned list always starts with the installer path itself followed
/// by the family-specific (or default) silent flags. Pure; never fails.
pub fn resolve(installer_path: &Path) -> Vec<String> {
    let file_name = installer_path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let args = SILENT_PARAM_TABLE
        .iter()
        .find(|(keyword, _)| file_name.contains(keyword))
        .map_or(DEFAULT_SILENT_ARGS, |(_, args)| args);

    let mut command_line = Vec::with_capacity(args.len() + 1);
    command_line.push(installer_path.to_string_lossy().into_owned());
    command_line.extend(args.iter().map(|a| (*a).to_string()));
    command_line
}
