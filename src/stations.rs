use crate::actions::Station;

/// Last-resort station list, used when neither the cache nor a fresh fetch
/// produced anything.
pub const FALLBACK_STATIONS: &[(&str, &str)] = &[
    ("bagel", "BAGeL Radio"),
    ("beatblender", "Beat Blender"),
    ("bootliquor", "Boot Liquor"),
    ("brfm", "Black Rock FM"),
    ("christmas", "Christmas Lounge"),
    ("xmasrocks", "Christmas Rocks!"),
    ("cliqhop", "cliqhop idm"),
    ("covers", "Covers"),
    ("events", "DEF CON Radio"),
    ("deepspaceone", "Deep Space One"),
    ("digitalis", "Digitalis"),
    ("doomed", "Doomed"),
    ("dronezone", "Drone Zone"),
    ("dubstep", "Dub Step Beyond"),
    ("earwaves", "Earwaves"),
    ("folkfwd", "Folk Forward"),
    ("groovesalad", "Groove Salad"),
    ("illstreet", "Illinois Street Lounge"),
    ("indiepop", "Indie Pop Rocks!"),
    ("jollysoul", "Jolly Ol' Soul"),
    ("lush", "Lush"),
    ("missioncontrol", "Mission Control"),
    ("poptron", "PopTron"),
    ("secretagent", "Secret Agent"),
    ("7soul", "Seven Inch Soul"),
    ("sf1033", "SF 10-33"),
    ("live", "SomaFM Live"),
    ("sonicuniverse", "Sonic Universe"),
    ("sxfm", "South by Soma"),
    ("spacestation", "Space Station Soma"),
    ("suburbsofgoa", "Suburbs of Goa"),
    ("thetrip", "The Trip"),
    ("thistle", "ThistleRadio"),
    ("u80s", "Underground 80s"),
    ("xmasinfrisko", "Xmas in Frisko"),
];

pub fn fallback_stations() -> Vec<Station> {
    FALLBACK_STATIONS
        .iter()
        .map(|(id, title)| Station::new(*id, *title))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fallback_list_is_stable() {
        let stations = fallback_stations();
        assert_eq!(stations.len(), 35);
        assert_eq!(stations[0], Station::new("bagel", "BAGeL Radio"));
        assert_eq!(stations[34], Station::new("xmasinfrisko", "Xmas in Frisko"));
    }

    #[test]
    fn fallback_ids_are_unique() {
        let ids: HashSet<&str> = FALLBACK_STATIONS.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), FALLBACK_STATIONS.len());
    }
}
