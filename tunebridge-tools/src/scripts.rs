//! AppleScript source builders for Music.app.
//!
//! Every builder takes the target application name. Text that came from a
//! caller must already be passed through [`crate::sanitize::sanitize_query`].

/// Player commands that take no arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Play,
    Pause,
    NextTrack,
    PreviousTrack,
}

impl Transport {
    pub fn command(self) -> &'static str {
        match self {
            Transport::Play => "play",
            Transport::Pause => "pause",
            Transport::NextTrack => "next track",
            Transport::PreviousTrack => "previous track",
        }
    }
}

pub fn transport(app: &str, command: Transport) -> String {
    format!(r#"tell application "{app}" to {}"#, command.command())
}

/// Tracks whose name contains `query`, one `"<name> - <artist>"` per line.
pub fn search_tracks(app: &str, query: &str) -> String {
    format!(
        r#"tell application "{app}"
    set trackList to every track whose name contains "{query}"
    set output to ""
    repeat with t in trackList
        set output to output & (name of t) & " - " & (artist of t) & linefeed
    end repeat
    return output
end tell"#
    )
}

/// Play the first track whose name is exactly `song`.
pub fn play_track(app: &str, song: &str) -> String {
    format!(
        r#"tell application "{app}"
    set theTrack to first track whose name is "{song}"
    play theTrack
    return "Now playing: " & (name of theTrack) & " by " & (artist of theTrack)
end tell"#
    )
}

/// Create a user playlist called `name` and copy in every track whose name
/// matches one of `songs`.
pub fn create_playlist(app: &str, name: &str, songs: &[String]) -> String {
    let conditions = songs
        .iter()
        .map(|song| format!(r#"name is "{song}""#))
        .collect::<Vec<_>>()
        .join(" or ");
    format!(
        r#"tell application "{app}"
    set newPlaylist to make new user playlist with properties {{name:"{name}"}}
    set matchingTracks to every track whose ({conditions})
    repeat with t in matchingTracks
        duplicate t to newPlaylist
    end repeat
    return "Playlist \"{name}\" created with " & (count of tracks of newPlaylist) & " tracks."
end tell"#
    )
}

pub fn library_summary(app: &str) -> String {
    format!(
        r#"tell application "{app}"
    set totalTracks to count of every track
    set totalPlaylists to count of user playlists
    return "Total tracks: " & totalTracks & linefeed & "Total playlists: " & totalPlaylists
end tell"#
    )
}

pub fn current_track(app: &str) -> String {
    format!(
        r#"tell application "{app}"
    if player state is playing then
        set currentTrack to current track
        return "Now playing: " & (name of currentTrack) & " by " & (artist of currentTrack) & " from " & (album of currentTrack)
    else
        return "No track is currently playing"
    end if
end tell"#
    )
}

/// The first `limit` library tracks, formatted like [`search_tracks`].
pub fn list_tracks(app: &str, limit: u32) -> String {
    format!(
        r#"tell application "{app}"
    set trackList to tracks 1 thru {limit}
    set output to ""
    repeat with t in trackList
        set output to output & (name of t) & " - " & (artist of t) & linefeed
    end repeat
    return output
end tell"#
    )
}
